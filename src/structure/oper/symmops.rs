/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::{Matrix3, Vector3};
use num_integer::Integer;
use primgrid_linalg::{IMat3, IVec3, IntPrecisionError, Tol};

use crate::Lattice;

// NOTE: Both types here act on column vectors: `x -> R x + t`.
//
//       A spacegroup operation only has an integer representation relative to
//       the primitive cell.  A supercell does not have its own spacegroup
//       independent of the primitive cell; that would allow a supercell
//       to have different physics!

/// A spacegroup operation in cartesian coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CartOp {
    pub rot: Matrix3<f64>,
    pub trans: Vector3<f64>,
}

/// A spacegroup operation in fractional coordinates of a primitive cell.
///
/// The translation is stored in twelfths, which is enough to represent the
/// fractional translation of every crystallographic spacegroup exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FracOp {
    rot: IMat3,
    /// Invariants:
    ///  - elements are reduced into the range `0 <= x < 12`.
    trans_12: IVec3,
}

impl Default for CartOp {
    fn default() -> Self
    { Self::eye() }
}

impl Default for FracOp {
    fn default() -> Self
    { Self::eye() }
}

impl CartOp {
    pub fn eye() -> Self
    { CartOp { rot: Matrix3::identity(), trans: Vector3::zeros() } }

    pub fn new(rot: Matrix3<f64>, trans: Vector3<f64>) -> Self
    { CartOp { rot, trans } }

    pub fn from_rot(rot: Matrix3<f64>) -> Self
    { CartOp { rot, trans: Vector3::zeros() } }

    pub fn from_trans(trans: Vector3<f64>) -> Self
    { CartOp { rot: Matrix3::identity(), trans } }

    pub fn transform_cart(&self, cart: &Vector3<f64>) -> Vector3<f64>
    { self.rot * cart + self.trans }

    /// The point group part in fractional coordinates of `lattice`.
    ///
    /// Fails if the rotation does not map `lattice` onto itself.
    pub fn frac_rot(&self, lattice: &Lattice, tol: f64) -> Result<IMat3, IntPrecisionError> {
        // cart = L^T frac  ==>  frac' = L^-T R L^T frac
        let lt = lattice.matrix().transpose();
        let lt_inv = lattice.inverse_matrix().transpose();
        Tol(tol).unfloat_m3(&(lt_inv * self.rot * lt))
    }

    /// The translation in fractional coordinates of `lattice`.
    pub fn frac_trans(&self, lattice: &Lattice) -> Vector3<f64>
    { lattice.cart_to_frac(&self.trans) }

    /// Fails if the rotation does not map `lattice` onto itself, or if the
    /// translation is not a multiple of `1/12` along each lattice vector.
    pub fn to_frac(&self, lattice: &Lattice, tol: f64) -> Result<FracOp, IntPrecisionError> {
        let rot = self.frac_rot(lattice, tol)?;
        let trans_12 = Tol(tol).unfloat_v3(&(self.frac_trans(lattice) * 12.0))?;
        Ok(FracOp::from_parts(rot, trans_12))
    }
}

impl CartOp {
    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.
    pub fn then(&self, other: &CartOp) -> CartOp
    {
        CartOp {
            rot: other.rot * self.rot,
            trans: other.rot * self.trans + other.trans,
        }
    }

    /// Conventional group operator.
    pub fn of(&self, other: &CartOp) -> CartOp
    { other.then(self) }
}

impl FracOp {
    pub fn eye() -> Self
    { FracOp { rot: IMat3::identity(), trans_12: IVec3::zeros() } }

    /// Construct from a rotation and a translation in twelfths.
    ///
    /// The rotation should be a matrix `R` such that `R x ~ x` for
    /// fractional positions `x` (as column vectors).
    pub fn new(rot: &IMat3, trans_12: &IVec3) -> Self
    {
        assert_eq!(primgrid_linalg::det(rot).abs(), 1, "rotation is not unimodular: {:?}", rot);
        FracOp::from_parts(*rot, *trans_12)
    }

    pub fn from_rot(rot: &IMat3) -> Self
    { FracOp::new(rot, &IVec3::zeros()) }

    fn from_parts(rot: IMat3, trans_12: IVec3) -> Self
    { FracOp { rot, trans_12: trans_12.map(|x| x.mod_floor(&12)) } }

    pub fn rot(&self) -> &IMat3
    { &self.rot }

    /// The translation, times 12.
    pub fn trans_12(&self) -> &IVec3
    { &self.trans_12 }

    pub fn trans(&self) -> Vector3<f64>
    { self.trans_12.map(|x| x as f64 / 12.0) }

    pub fn transform_frac(&self, frac: &Vector3<f64>) -> Vector3<f64>
    { self.rot.map(|x| x as f64) * frac + self.trans() }

    pub fn to_cart(&self, lattice: &Lattice) -> CartOp
    {
        let lt = lattice.matrix().transpose();
        let lt_inv = lattice.inverse_matrix().transpose();
        CartOp {
            rot: lt * self.rot.map(|x| x as f64) * lt_inv,
            trans: lattice.frac_to_cart(&self.trans()),
        }
    }
}

impl FracOp {
    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.
    pub fn then(&self, other: &FracOp) -> FracOp
    {
        // reduce the translation for a unique representation
        FracOp::from_parts(
            other.rot * self.rot,
            other.rot * self.trans_12 + other.trans_12,
        )
    }

    /// Conventional group operator.
    pub fn of(&self, other: &FracOp) -> FracOp
    { other.then(self) }
}
