/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use num_integer::Integer;
use num_traits::{PrimInt, Signed};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GcdData<X> {
    /// Greatest common divisor; never negative.
    pub gcd: X,
    /// Bezout coefficients `(s, t)` with `s * a + t * b == gcd`.
    pub coeffs: (X, X),
}

/// Compute a greatest common divisor along with Bezout coefficients.
///
/// `extended_gcd(0, 0)` has a gcd of zero and coefficients `(1, 0)`.
pub fn extended_gcd<X>(a: X, b: X) -> GcdData<X>
where
    X: PrimInt + Integer + Signed,
{
    let (a_sign, a) = (a.signum(), a.abs());
    let (b_sign, b) = (b.signum(), b.abs());

    // Order is (old, current).
    let mut s = (X::one(), X::zero());
    let mut t = (X::zero(), X::one());
    let mut r = (a, b);
    while r.1 != X::zero() {
        let (div, rem) = r.0.div_rem(&r.1);
        r = (r.1, rem);
        s = (s.1, s.0 - div * s.1);
        t = (t.1, t.0 - div * t.1);
    }

    // signum(0) is 0, which would wipe out the coefficient of a zero input.
    let fix_sign = |sign: X| if sign == X::zero() { X::one() } else { sign };
    GcdData {
        gcd: r.0,
        coeffs: (fix_sign(a_sign) * s.0, fix_sign(b_sign) * t.0),
    }
}
