/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::sync::Arc;

use nalgebra::{Matrix3, Vector3};
use primgrid_linalg::{IMat3, Tol};

/// Defines a vector basis for periodic boundary conditions in three dimensions.
///
/// The stored matrix is row-based: **rows are lattice vectors**.  A point with
/// fractional coordinates `f` (a column vector) sits at `matrix^T * f` in
/// cartesian space.  Use [`Lattice::frac_to_cart`] and [`Lattice::cart_to_frac`]
/// rather than thinking about this too hard.
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Arc<Matrix3<f64>>,
    inverse: Arc<Matrix3<f64>>,
}

// Manual impl that doesn't compare the inverse.
impl PartialEq<Lattice> for Lattice {
    fn eq(&self, other: &Lattice) -> bool {
        // deconstruct to get errors when new fields are added
        let Lattice { ref matrix, inverse: _ } = *self;
        matrix == &other.matrix
    }
}

impl Lattice {
    /// Create a lattice from a matrix where the rows are lattice vectors.
    ///
    /// # Panics
    ///
    /// Panics if the vectors are linearly dependent.
    pub fn new(matrix: &Matrix3<f64>) -> Self {
        Self::try_new(matrix)
            .unwrap_or_else(|| panic!("lattice vectors are linearly dependent: {:?}", matrix))
    }

    /// Create a lattice from a matrix where the rows are lattice vectors,
    /// or `None` if the vectors are linearly dependent.
    pub fn try_new(matrix: &Matrix3<f64>) -> Option<Self> {
        if matrix.determinant() == 0.0 {
            return None;
        }
        let inverse = matrix.try_inverse()?;
        Some(Lattice {
            matrix: Arc::new(*matrix),
            inverse: Arc::new(inverse),
        })
    }

    pub fn from_vectors(vectors: &[[f64; 3]; 3]) -> Self {
        let [a, b, c] = *vectors;
        Self::new(&Matrix3::new(
            a[0], a[1], a[2],
            b[0], b[1], b[2],
            c[0], c[1], c[2],
        ))
    }

    /// Matrix where lattice vectors are rows.
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64>
    { &self.matrix }

    /// Get the (precomputed) inverse of the matrix where lattice vectors are rows.
    #[inline]
    pub fn inverse_matrix(&self) -> &Matrix3<f64>
    { &self.inverse }

    /// Get the `k`th lattice vector.
    pub fn vector(&self, k: usize) -> Vector3<f64>
    { self.matrix.row(k).transpose() }

    /// Get the (positive) volume of the lattice cell.
    pub fn volume(&self) -> f64
    { self.matrix.determinant().abs() }

    pub fn frac_to_cart(&self, frac: &Vector3<f64>) -> Vector3<f64>
    { self.matrix.tr_mul(frac) }

    pub fn cart_to_frac(&self, cart: &Vector3<f64>) -> Vector3<f64>
    { self.inverse.tr_mul(cart) }

    /// Apply a cartesian linear transformation (acting on column vectors) to every lattice vector.
    pub fn transformed_by(&self, cart_rot: &Matrix3<f64>) -> Lattice
    { Lattice::new(&(*self.matrix * cart_rot.transpose())) }

    /// Take an integer linear combination of the lattice vectors.
    ///
    /// Row `i` of `coeffs` holds the coefficients of the `i`th output vector,
    /// so e.g. a diagonal matrix produces a diagonal supercell.
    pub fn linear_combination(&self, coeffs: &IMat3) -> Lattice
    { Lattice::new(&(coeffs.map(|x| x as f64) * *self.matrix)) }

    /// The basis change from this lattice to `other`, in the column convention.
    ///
    /// Column `j` of the output holds the `j`th vector of `other` in fractional
    /// coordinates of `self`. For a supercell of `self` this is an integer matrix
    /// (up to roundoff).
    pub fn transformation_to(&self, other: &Lattice) -> Matrix3<f64>
    { (*other.matrix * *self.inverse).transpose() }

    /// Test if two Lattices represent the same Bravais lattice,
    /// in the mathematical sense. This is to say that they each
    /// generate the same infinite set of displacement vectors.
    ///
    /// They do if and only if the basis change between them is unimodular.
    ///
    /// `tol` is an absolute tolerance used to test integerness of a float.
    pub fn is_equivalent_to(&self, tol: f64, other: &Lattice) -> bool {
        match Tol(tol).unfloat_m3(&self.transformation_to(other)) {
            Ok(m) => primgrid_linalg::is_unimodular(&m),
            Err(_) => false,
        }
    }
}

/// Helper constructors
impl Lattice {
    /// The identity lattice.
    #[inline]
    pub fn eye() -> Self { Self::cubic(1.0) }

    #[inline]
    pub fn diagonal(&[x, y, z]: &[f64; 3]) -> Self { Self::orthorhombic(x, y, z) }

    /// A cubic lattice ((a, a, a), (90, 90, 90))
    #[inline]
    pub fn cubic(a: f64) -> Self { Self::orthorhombic(a, a, a) }

    /// An orthorhombic lattice ((a, b, c), (90, 90, 90))
    #[inline]
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self
    { Self::new(&Matrix3::from_diagonal(&Vector3::new(a, b, c))) }
}

/// Defaults to the identity matrix.
impl Default for Lattice {
    #[inline]
    fn default() -> Lattice { Lattice::eye() }
}
