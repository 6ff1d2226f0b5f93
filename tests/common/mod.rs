/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#![allow(dead_code)]

use nalgebra::Vector3;
use primgrid::{CartOp, FracOp, Lattice};
use primgrid::linalg::IMat3;
use primgrid::structure::generate_finite_group;

pub fn init_logger() {
    let _ = env_logger::try_init();
}

/// The 48 operations of the cubic point group, for a lattice with cubic symmetry.
pub fn cubic_point_group(lattice: &Lattice) -> Vec<CartOp> {
    let generators = [
        FracOp::from_rot(&IMat3::new(0, -1, 0, 1, 0, 0, 0, 0, 1)),
        FracOp::from_rot(&IMat3::new(0, 0, 1, 1, 0, 0, 0, 1, 0)),
        FracOp::from_rot(&-IMat3::identity()),
    ];
    generate_finite_group(&generators, |a, b| a.then(b))
        .iter()
        .map(|op| op.to_cart(lattice))
        .collect()
}

/// Assert that two lists of fractional positions agree modulo the lattice.
pub fn assert_same_sites_mod_lattice(
    lattice: &Lattice,
    actual: &[Vector3<f64>],
    expected: &[Vector3<f64>],
    tol: f64,
) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, b)) in actual.iter().zip(expected).enumerate() {
        let diff = (a - b).map(|x| x - x.round());
        let dist = lattice.frac_to_cart(&diff).norm();
        assert!(dist < tol, "site {}: {:?} vs {:?} (distance {})", i, a, b, dist);
    }
}

/// Find the operation in `ops` equal to `target` (translations compared modulo `lattice`).
pub fn index_of_op(ops: &[CartOp], target: &CartOp, lattice: &Lattice, tol: f64) -> Option<usize> {
    ops.iter().position(|op| {
        let diff = lattice.cart_to_frac(&(op.trans - target.trans)).map(|x| x - x.round());
        (op.rot - target.rot).norm() < tol && lattice.frac_to_cart(&diff).norm() < tol
    })
}
