/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::{Matrix3, Vector3};
use primgrid_linalg::{IMat3, IntPrecisionError};

/// Failure to establish a grid of primitive cell translations in a supercell.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    #[error(
        "attempted to build a grid for a superlattice that is not larger than its primitive \
         lattice; floating-point transformation matrix {float:?} was rounded to singular \
         integer matrix {rounded:?}"
    )]
    SingularTransformation {
        float: Matrix3<f64>,
        rounded: IMat3,
    },

    #[error(
        "superlattice is not an integer multiple of the primitive lattice; floating-point \
         transformation matrix {float:?} is not within {tol} of {rounded:?}"
    )]
    NonIntegerTransformation {
        float: Matrix3<f64>,
        rounded: IMat3,
        tol: f64,
    },

    #[error(
        "forced canonical basis U = {u:?}, S = {diag:?} is inconsistent with the \
         transformation matrix {trans:?}: {reason}"
    )]
    InconsistentBasis {
        u: IMat3,
        diag: [i64; 3],
        trans: IMat3,
        reason: &'static str,
    },
}

/// Failure to map a symmetry operation onto the site index space of a grid.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SymmetryError {
    #[error("no basis permutation was provided for symmetry operation {op_index}")]
    MissingBasisPermutation { op_index: usize },

    #[error(
        "basis permutation for symmetry operation {op_index} has {actual} sites, \
         but {expected} sublattices were requested"
    )]
    BasisPermutationLength {
        op_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "basis permutation for symmetry operation {op_index} sends site {site} to \
         sublattice {sublat:?}, which is not in 0..{num_sublats}"
    )]
    BadSublattice {
        op_index: usize,
        site: usize,
        sublat: Option<usize>,
        num_sublats: usize,
    },

    #[error("basis permutation for symmetry operation {op_index} sends two sites to sublattice {sublat}")]
    NonBijectiveBasisPermutation { op_index: usize, sublat: usize },

    #[error("symmetry operation {op_index} does not map the supercell lattice onto itself")]
    NonInvariantSupercell { op_index: usize },

    #[error("point group part of symmetry operation {op_index} is not integral in fractional coordinates")]
    NonIntegerRotation {
        op_index: usize,
        #[source]
        cause: IntPrecisionError,
    },
}

/// No site in the primitive structure matches the image of a site under some operation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("image {image:?} of site {site} under symmetry operation {op_index} matches no site (tolerance {tol})")]
pub struct PositionMatchError {
    pub op_index: usize,
    pub site: usize,
    /// Fractional coordinates of the unmatched image.
    pub image: Vector3<f64>,
    pub tol: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("tried to construct an invalid permutation")]
pub struct InvalidPermutationError;

/// Unequal image displacements or the wrong number of sites when recovering a primitive cell.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeconstructError {
    #[error("supercell has {num_sites} sites, which is not a multiple of the {num_cells} cells")]
    WrongSiteCount { num_sites: usize, num_cells: usize },

    #[error("images of primitive site {site} moved by unequal amounts (spread of {spread})")]
    BigDisplacement { site: usize, spread: f64 },
}
