/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::{IMat3, det, extended_gcd};
use nalgebra::Matrix2;

/// Result of Smith Normal Form decomposition, with some extra tidbits.
///
/// The decomposition satisfies `original == u * s * v`, where `u` and `v` are
/// unimodular and `s` is the diagonal matrix built from `diag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmithDecomp {
    /// Left unimodular factor.
    pub u: IMat3,
    /// The exact inverse of `u`.
    pub u_inv: IMat3,
    /// Diagonal of `S`. Positive, and each element divides the next.
    pub diag: [i64; 3],
    /// Right unimodular factor.
    pub v: IMat3,
    /// The exact inverse of `v`.
    pub v_inv: IMat3,
}

impl SmithDecomp {
    /// `S` as a full matrix.
    pub fn matrix_s(&self) -> IMat3 {
        IMat3::from_diagonal(&self.diag.into())
    }

    // This tests all necessary conditions to ensure that the result is correct.
    fn validate(&self, original: &IMat3) {
        let SmithDecomp { u, u_inv, diag, v, v_inv } = *self;
        assert_eq!(u * u_inv, IMat3::identity(), "{:?}", self);
        assert_eq!(v * v_inv, IMat3::identity(), "{:?}", self);
        assert_eq!(u * self.matrix_s() * v, *original, "{:?}", self);
        assert!(diag.iter().all(|&x| x > 0), "{:?}", self);
        assert_eq!(diag[1] % diag[0], 0, "{:?}", self);
        assert_eq!(diag[2] % diag[1], 0, "{:?}", self);
    }
}

/// Decompose a nonsingular integer matrix into Smith Normal Form.
///
/// # Panics
///
/// Panics if `m` is singular.  (a zero on the diagonal of `S` is only possible
/// for singular input, so the diagonal of the output is always positive)
pub fn smith_normal_form(m: &IMat3) -> SmithDecomp {
    assert_ne!(
        det(m), 0,
        "smith normal form requested for singular matrix {:?}", m,
    );

    let mut state = UnimodularState::start(*m);
    for t in 0..3 {
        state.reduce_pivot(t);
    }
    let UnimodularState { matrix, left, left_inv, right, right_inv } = state;

    // left * m * right == matrix
    let out = SmithDecomp {
        u: left_inv,
        u_inv: left,
        diag: [matrix[(0, 0)], matrix[(1, 1)], matrix[(2, 2)]],
        v: right_inv,
        v_inv: right,
    };
    trace!("smith normal form of {:?}: {:?}", m, out);

    if cfg!(debug_assertions) {
        out.validate(m);
    }
    out
}

// used for intermediate results of the computation that are not yet diagonal.
struct UnimodularState {
    /// The transformed matrix, `left * original * right`.
    matrix: IMat3,
    left: IMat3,
    left_inv: IMat3,
    right: IMat3,
    right_inv: IMat3,
}

impl UnimodularState {
    fn start(m: IMat3) -> Self {
        UnimodularState {
            matrix: m,
            left: IMat3::identity(),
            left_inv: IMat3::identity(),
            right: IMat3::identity(),
            right_inv: IMat3::identity(),
        }
    }

    // row operation: matrix <- op * matrix
    fn transform_rows(&mut self, op: IMat3, op_inv: IMat3) {
        debug_assert_eq!(op * op_inv, IMat3::identity());
        self.matrix = op * self.matrix;
        self.left = op * self.left;
        self.left_inv = self.left_inv * op_inv;
    }

    // column operation: matrix <- matrix * op
    fn transform_cols(&mut self, op: IMat3, op_inv: IMat3) {
        debug_assert_eq!(op * op_inv, IMat3::identity());
        self.matrix = self.matrix * op;
        self.right = self.right * op;
        self.right_inv = op_inv * self.right_inv;
    }

    // Make matrix[t][t] a positive number that divides every element of the
    // trailing submatrix, with zeros elsewhere in row t and column t.
    //
    // Every pass that does not finish strictly decreases |matrix[t][t]|,
    // so this terminates.
    fn reduce_pivot(&mut self, t: usize) {
        loop {
            if self.matrix[(t, t)] == 0 {
                self.move_nonzero_to_pivot(t);
            }

            for i in t + 1..3 {
                if self.matrix[(i, t)] != 0 {
                    self.make_row_gcd(t, i);
                }
            }
            for j in t + 1..3 {
                if self.matrix[(t, j)] != 0 {
                    self.make_col_gcd(t, j);
                }
            }

            // column operations can put things back under the pivot
            if (t + 1..3).any(|i| self.matrix[(i, t)] != 0) {
                continue;
            }

            let pivot = self.matrix[(t, t)];
            let offender = (t + 1..3).find(|&i| {
                (t + 1..3).any(|j| self.matrix[(i, j)] % pivot != 0)
            });
            match offender {
                // Pull the offending row into row t; the next round of
                // column gcds will then shrink the pivot.
                Some(i) => {
                    let mut op = IMat3::identity();
                    let mut op_inv = IMat3::identity();
                    op[(t, i)] = 1;
                    op_inv[(t, i)] = -1;
                    self.transform_rows(op, op_inv);
                },
                None => break,
            }
        }

        if self.matrix[(t, t)] < 0 {
            let mut flip = IMat3::identity();
            flip[(t, t)] = -1;
            self.transform_rows(flip, flip);
        }
        debug_assert!(self.matrix[(t, t)] > 0);
    }

    fn move_nonzero_to_pivot(&mut self, t: usize) {
        let (i, j) = iproduct!(t..3, t..3)
            .find(|&(i, j)| self.matrix[(i, j)] != 0)
            .unwrap_or_else(|| panic!("(BUG) singular trailing submatrix in {:?}", self.matrix));

        let row_swap = swap_matrix(t, i);
        self.transform_rows(row_swap, row_swap);
        let col_swap = swap_matrix(t, j);
        self.transform_cols(col_swap, col_swap);
    }

    // Apply a unimodular row operation on rows (t, i) such that matrix[t][t] becomes
    // the gcd of the original values of matrix[t][t] and matrix[i][t], and matrix[i][t]
    // becomes zero.
    fn make_row_gcd(&mut self, t: usize, i: usize) {
        let (op, op_inv) = gcd_block(self.matrix[(t, t)], self.matrix[(i, t)]);
        self.transform_rows(embed(op, t, i), embed(op_inv, t, i));
        debug_assert_eq!(self.matrix[(i, t)], 0);
    }

    // The same as `make_row_gcd`, but for columns (t, j) along row t.
    fn make_col_gcd(&mut self, t: usize, j: usize) {
        let (op, op_inv) = gcd_block(self.matrix[(t, t)], self.matrix[(t, j)]);
        self.transform_cols(embed(op.transpose(), t, j), embed(op_inv.transpose(), t, j));
        debug_assert_eq!(self.matrix[(t, j)], 0);
    }
}

// A 2x2 unimodular matrix (and its inverse) taking the column `(a, b)` to `(gcd, 0)`.
fn gcd_block(a: i64, b: i64) -> (Matrix2<i64>, Matrix2<i64>) {
    let data = extended_gcd(a, b);
    let g = data.gcd;
    let (s, t) = data.coeffs;
    debug_assert_ne!(g, 0);

    // det = (s * a + t * b) / g = 1
    let op = Matrix2::new(
        s, t,
        -b / g, a / g,
    );
    let op_inv = Matrix2::new(
        a / g, -t,
        b / g, s,
    );
    (op, op_inv)
}

fn embed(m: Matrix2<i64>, axis_0: usize, axis_1: usize) -> IMat3 {
    let mut out = IMat3::identity();
    out[(axis_0, axis_0)] = m[(0, 0)];
    out[(axis_0, axis_1)] = m[(0, 1)];
    out[(axis_1, axis_0)] = m[(1, 0)];
    out[(axis_1, axis_1)] = m[(1, 1)];
    out
}

fn swap_matrix(a: usize, b: usize) -> IMat3 {
    let mut out = IMat3::identity();
    out.swap_rows(a, b);
    out
}
