/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Exact integer linear algebra on 3x3 matrices.
//!
//! Everything in here is integer arithmetic on `i64`, with the sole exception
//! of [`round_to_integer`] and [`Tol`], which are the gateway from floating point
//! lattice data into the integer world.
//!
//! Matrices follow the column convention: a matrix acts on column vectors
//! from the left.

#[macro_use]
extern crate log;
#[macro_use]
extern crate itertools;

pub use self::gcd::{extended_gcd, GcdData};
mod gcd;

pub use self::imat::{IMat3, IVec3};
pub use self::imat::{det, adjugate, round_to_integer, is_unimodular, unimodular_inverse};
pub use self::imat::{RationalInverse, rational_inverse};
pub use self::imat::{Tol, IntPrecisionError};
mod imat;

pub use self::snf::{SmithDecomp, smith_normal_form};
mod snf;
