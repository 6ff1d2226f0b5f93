/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::{Matrix3, Vector3};

/// A 3x3 integer matrix.
pub type IMat3 = Matrix3<i64>;
/// An integer column vector of length 3.
pub type IVec3 = Vector3<i64>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("not nearly an integer: {value} (tolerance {tol})")]
pub struct IntPrecisionError {
    pub value: f64,
    pub tol: f64,
}

/// Exact determinant.
pub fn det(m: &IMat3) -> i64 {
    let adj = adjugate(m);
    (0..3).map(|k| m[(0, k)] * adj[(k, 0)]).sum()
}

/// The transpose of the cofactor matrix.
///
/// Satisfies `m * adjugate(m) == det(m) * I` without any division,
/// which is what lets callers avoid a floating point inverse.
pub fn adjugate(m: &IMat3) -> IMat3 {
    // (the cyclic index trick folds the cofactor signs into the ordering)
    IMat3::from_fn(|i, j| {
        let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        m[(j1, i1)] * m[(j2, i2)] - m[(j1, i2)] * m[(j2, i1)]
    })
}

/// Round each element to the nearest integer.
///
/// No check is performed on the size of the rounding error, nor on
/// whether the result is singular; see [`Tol`] for the checked version.
pub fn round_to_integer(m: &Matrix3<f64>) -> IMat3 {
    m.map(|x| x.round() as i64)
}

pub fn is_unimodular(m: &IMat3) -> bool {
    det(m).abs() == 1
}

/// The exact inverse of a unimodular matrix, or `None` if the matrix is not unimodular.
pub fn unimodular_inverse(m: &IMat3) -> Option<IMat3> {
    match det(m) {
        d @ 1 | d @ -1 => Some(adjugate(m) * d),
        _ => None,
    }
}

/// The inverse of an integer matrix, as an integer matrix over a positive denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalInverse {
    /// `|det(m)| * m^-1`. Always integral.
    pub numer: IMat3,
    /// `|det(m)|`. Always positive.
    pub denom: i64,
}

/// Exact inverse of a nonsingular integer matrix, or `None` if it is singular.
pub fn rational_inverse(m: &IMat3) -> Option<RationalInverse> {
    let d = det(m);
    if d == 0 {
        return None;
    }
    Some(RationalInverse {
        numer: adjugate(m) * d.signum(),
        denom: d.abs(),
    })
}

// these f64 -> i64 conversions are written on a silly little type
// simply to avoid having a function with a signature like 'fn f(x: f64, tol: f64)'
// where the arguments could be swapped
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tol(pub f64);

impl Tol {
    pub fn unfloat(&self, x: f64) -> Result<i64, IntPrecisionError> {
        let r = x.round();
        if !((r - x).abs() <= self.0) {
            return Err(IntPrecisionError { value: x, tol: self.0 });
        }
        Ok(r as i64)
    }

    pub fn unfloat_v3(&self, v: &Vector3<f64>) -> Result<IVec3, IntPrecisionError> {
        Ok(IVec3::new(self.unfloat(v[0])?, self.unfloat(v[1])?, self.unfloat(v[2])?))
    }

    pub fn unfloat_m3(&self, m: &Matrix3<f64>) -> Result<IMat3, IntPrecisionError> {
        let mut out = IMat3::zeros();
        for r in 0..3 {
            for c in 0..3 {
                out[(r, c)] = self.unfloat(m[(r, c)])?;
            }
        }
        Ok(out)
    }
}
