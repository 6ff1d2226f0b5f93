/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Primitive cell translations in a supercell, and the permutations of
//! supercell sites induced by symmetry operations.
//!
//! The central type is [`PrimGrid`], which assigns a flat index to every
//! primitive cell translation of a supercell (modulo the supercell).
//! Sites of a supercell tiled from a primitive structure with `NB` sites
//! are indexed as `l + b * grid.size()`, and [`group_permutations`] and
//! [`translation_permutations`] produce the permutations of this index
//! space induced by symmetry operations.

#[macro_use] extern crate log;
#[macro_use] extern crate itertools;

pub mod supercell {
    pub use crate::algo::supercell::{
        tile,
        SupercellToken,
        expand_factor_group,
    };
}

pub mod config;
mod errors;
mod geom;
mod algo;
mod oper;

//---------------------------
// public reexports; API

pub use crate::geom::lattice::Lattice;
pub use crate::geom::coords::{UnitCellCoord, CanonicalCoord};
pub use crate::geom::structure::Structure;

pub use crate::algo::grid::{PrimGrid, CellKind, SiteCoord};
pub use crate::algo::basis_perm::{BasisPermuteLookup, BasisPermRep, find_basis_permutation};
pub use crate::algo::perm_rep::{group_permutations, translation_permutations, PermRepCache};
pub use crate::algo::group::{generate_finite_group, SymGroup};

pub use crate::oper::{Perm, Permute};
pub use crate::oper::{CartOp, FracOp};

pub use crate::config::{GridSettings, Threading, YamlRead};

pub use crate::errors::{GridError, SymmetryError, PositionMatchError};
pub use crate::errors::{InvalidPermutationError, DeconstructError};
pub use crate::supercell::SupercellToken;
