/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Supercell translation grids and site permutation representations for periodic crystals.
//!
//! This crate only re-exports the workspace members:
//!
//! * [`linalg`]: exact integer matrix utilities (Smith normal form, adjugate, ...)
//! * [`structure`]: lattices, the [`PrimGrid`] enumeration of primitive cells in
//!   a supercell, and the permutations of supercell sites induced by symmetry.

pub use primgrid_linalg as linalg;
pub use primgrid_structure as structure;

pub use primgrid_structure::{Lattice, Structure, UnitCellCoord, CanonicalCoord};
pub use primgrid_structure::{PrimGrid, CellKind, SiteCoord};
pub use primgrid_structure::{Perm, Permute, CartOp, FracOp, SymGroup};
pub use primgrid_structure::{group_permutations, translation_permutations};
pub use primgrid_structure::{GridSettings, GridError, SymmetryError};
