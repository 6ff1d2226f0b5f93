/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use itertools::{Itertools, MinMaxResult};
use nalgebra::{Matrix3, Vector3};
use primgrid_linalg::IVec3;

use crate::{Structure, Lattice, PrimGrid, CellKind, CartOp, GridSettings};
use crate::DeconstructError;

/// Fill the supercell of `grid` with images of a primitive structure.
///
/// Site `b * grid.size() + l` of the output is the image of primitive site `b`
/// translated by `grid.uccoord(l)`, which is the site order used by the
/// permutations from [`crate::group_permutations`].
///
/// # Panics
///
/// Panics if `prim` does not have the grid's primitive lattice.
pub fn tile<M: Clone>(prim: &Structure<M>, grid: &PrimGrid<'_>) -> (Structure<M>, SupercellToken) {
    assert_eq!(
        prim.lattice(), grid.prim_lattice(),
        "the grid was built for a different primitive lattice",
    );
    let scel = grid.scel_lattice();
    let num_cells = grid.size();

    let cells: Vec<IVec3> = (0..num_cells).map(|l| grid.uccoord(l).cell).collect();
    let offsets: Vec<Vector3<f64>> = (0..num_cells).map(|l| grid.coord(l, CellKind::Prim).cart).collect();

    let mut fracs = Vec::with_capacity(num_cells * prim.num_sites());
    let mut meta = Vec::with_capacity(num_cells * prim.num_sites());
    for (cart, m) in prim.to_carts().into_iter().zip(prim.meta()) {
        fracs.extend(offsets.iter().map(|offset| scel.cart_to_frac(&(cart + offset))));
        meta.extend(std::iter::repeat(m).take(num_cells).cloned());
    }

    // prim = (T^T)^-1 scel, where (T^T)^-1 = plane^T / volume
    let inverse_coeffs = grid.plane_mat().transpose().map(|x| x as f64) / num_cells as f64;

    let token = SupercellToken {
        num_prim_sites: prim.num_sites(),
        cells,
        inverse_coeffs,
    };
    (Structure::new(scel.clone(), fracs, meta), token)
}

/// Contains enough information to deconstruct a supercell produced by [`tile`].
#[derive(Debug, Clone)]
pub struct SupercellToken {
    num_prim_sites: usize,
    // natural coordinates of each grid translation
    cells: Vec<IVec3>,
    // primitive lattice vectors in units of supercell lattice vectors (rows)
    inverse_coeffs: Matrix3<f64>,
}

impl SupercellToken {
    pub fn num_cells(&self) -> usize
    { self.cells.len() }

    pub fn num_prim_sites(&self) -> usize
    { self.num_prim_sites }

    /// The index of the image of primitive site `b` in cell `l`.
    pub fn site_index(&self, b: usize, l: usize) -> usize {
        assert!(b < self.num_prim_sites, "primitive site {} is out of range 0..{}", b, self.num_prim_sites);
        assert!(l < self.num_cells(), "cell {} is out of range 0..{}", l, self.num_cells());
        b * self.num_cells() + l
    }

    /// Takes data for each site of the primitive cell and expands it to the
    /// size of the supercell.
    pub fn replicate<M>(&self, vec: &[M]) -> Vec<M>
    where M: Clone,
    {
        let mut out = Vec::with_capacity(vec.len() * self.num_cells());
        for m in vec {
            let new_len = out.len() + self.num_cells();
            out.resize(new_len, m.clone());
        }
        out
    }

    /// Recover a primitive cell by averaging positions from a supercell.
    ///
    /// Uses metadata from the first image of each site.
    ///
    /// May fail if any of the following have occurred since the token was created:
    /// * Addition or deletion of sites
    /// * Reordering of sites
    /// * Images of a site did not move by equal amounts (within `validation_radius`)
    ///
    /// Wrapping of positions into the supercell is fine.
    pub fn deconstruct<M>(
        &self,
        validation_radius: f64,
        structure: Structure<M>,
    ) -> Result<Structure<M>, DeconstructError> {
        let num_cells = self.num_cells();
        if structure.num_sites() != num_cells * self.num_prim_sites {
            return Err(DeconstructError::WrongSiteCount { num_sites: structure.num_sites(), num_cells });
        }

        let (scel, scel_fracs, meta) = structure.into_parts();
        let prim = Lattice::new(&(self.inverse_coeffs * scel.matrix()));

        let mut fracs = Vec::with_capacity(self.num_prim_sites);
        for (site, images) in scel_fracs.chunks(num_cells).enumerate() {
            let first = prim.cart_to_frac(&scel.frac_to_cart(&images[0]));

            // displacement of each image from its ideal position relative to the first image,
            // with any wrapping undone
            let displacements: Vec<Vector3<f64>> = images.iter().zip(&self.cells)
                .map(|(frac, cell)| {
                    let rel = prim.cart_to_frac(&scel.frac_to_cart(frac)) - first - cell.map(|x| x as f64);
                    let rel = rel - scel_wrap(&prim, &scel, &rel);
                    prim.frac_to_cart(&rel)
                })
                .collect();

            let mut mean = Vector3::zeros();
            for k in 0..3 {
                let spread = match displacements.iter().map(|v| v[k]).minmax_by(|a, b| {
                    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
                }) {
                    MinMaxResult::NoElements => 0.0,
                    MinMaxResult::OneElement(_) => 0.0,
                    MinMaxResult::MinMax(min, max) => max - min,
                };
                if !(spread <= 2.0 * validation_radius) {
                    return Err(DeconstructError::BigDisplacement { site, spread });
                }
                mean[k] = displacements.iter().map(|v| v[k]).sum::<f64>() / num_cells as f64;
            }
            fracs.push(first + prim.cart_to_frac(&mean));
        }

        let meta = meta.into_iter().step_by(num_cells).collect();
        Ok(Structure::new(prim, fracs, meta))
    }
}

// The supercell lattice vector nearest to a primitive-fractional displacement,
// in primitive-fractional coordinates.
fn scel_wrap(prim: &Lattice, scel: &Lattice, prim_frac: &Vector3<f64>) -> Vector3<f64> {
    let scel_frac = scel.cart_to_frac(&prim.frac_to_cart(prim_frac));
    let nearest = scel_frac.map(|x| x.round());
    prim.cart_to_frac(&scel.frac_to_cart(&nearest))
}

/// The factor group of a supercell.
///
/// Every operation of the primitive structure whose point group part maps the
/// supercell lattice onto itself is combined with every translation of the grid.
/// Translations are reduced into the supercell.  Operations that do not preserve
/// the supercell lattice are dropped with a warning.
pub fn expand_factor_group(
    grid: &PrimGrid<'_>,
    prim_ops: &[CartOp],
    settings: &GridSettings,
) -> Vec<CartOp> {
    let prim = grid.prim_lattice();
    let scel = grid.scel_lattice();

    let translations: Vec<_> = (0..grid.size()).map(|l| grid.coord(l, CellKind::Prim).cart).collect();
    let wrap = |cart: Vector3<f64>| {
        let frac = scel.cart_to_frac(&cart).map(|x| x - (x + settings.floor_tol).floor());
        scel.frac_to_cart(&frac)
    };

    let mut out = Vec::with_capacity(prim_ops.len() * translations.len());
    for (op_index, op) in prim_ops.iter().enumerate() {
        let keep = match op.frac_rot(prim, settings.int_tol) {
            Ok(rot) => grid.is_symmetry_of_supercell(&rot),
            Err(_) => false,
        };
        if !keep {
            warn!("dropping symmetry operation {} which does not preserve the supercell", op_index);
            continue;
        }
        out.extend(translations.iter().map(|t| CartOp::new(op.rot, wrap(op.trans + t))));
    }
    out
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::FracOp;
    use primgrid_linalg::IMat3;

    fn assert_close(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn diagonal_supercell_smoke_test() {
        let original = Structure::new_coords(Lattice::eye(), vec![Vector3::zeros()]);
        let scel = original.lattice().linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(original.lattice(), &scel).unwrap();
        let (supercell, token) = tile(&original, &grid);

        assert_eq!(supercell.num_sites(), 8);
        assert_eq!(supercell.lattice(), &Lattice::cubic(2.0));
        for (l, cart) in supercell.to_carts().iter().enumerate() {
            assert_close(cart, &grid.uccoord(l).cell_frac());
        }

        let deconstructed = token.deconstruct(1e-10, supercell).unwrap();
        assert_close(&deconstructed.fracs()[0], &original.fracs()[0]);
        assert_eq!(original.lattice(), deconstructed.lattice());
    }

    #[test]
    fn nondiagonal_supercell() {
        // nondiagonal lattice so that matrix multiplication order matters
        let prim = Lattice::from_vectors(&[
            [2.0, 2.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 2.0],
        ]);
        let original = Structure::new(
            prim.clone(),
            vec![
                Vector3::new(0.5, -0.5, 0.0), // cart: [+1.0, -1.0,  0.0]
                Vector3::new(0.0, 0.5, 0.5),  // cart: [ 0.0, +2.0, +1.0]
            ],
            vec!['a', 'b'],
        );
        let scel = prim.linear_combination(&IMat3::new(
            1, 1, 0,
            -1, 2, 0,
            0, 0, 2,
        ));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        let (supercell, token) = tile(&original, &grid);

        assert_eq!(token.num_cells(), 6);
        assert_eq!(token.num_prim_sites(), 2);
        assert_eq!(supercell.num_sites(), 12);
        assert_eq!(supercell.meta(), &token.replicate(&['a', 'b'])[..]);

        let carts = supercell.to_carts();
        let prim_carts = original.to_carts();
        for b in 0..2 {
            for l in 0..6 {
                let expected = prim_carts[b] + grid.coord(l, CellKind::Prim).cart;
                assert_close(&carts[token.site_index(b, l)], &expected);
            }
        }

        // wrapping and a uniform shift are both fine
        let mut moved = supercell.clone();
        moved.reduce_positions();
        let shift = Vector3::new(0.01, 0.0, -0.02);
        let moved = Structure::new(
            moved.lattice().clone(),
            moved.fracs().iter().map(|f| f + shift).collect(),
            moved.meta().to_vec(),
        );
        let deconstructed = token.deconstruct(1e-8, moved).unwrap();
        assert_eq!(deconstructed.meta(), &['a', 'b']);
        assert!(deconstructed.lattice().is_equivalent_to(1e-8, &prim));
        assert!((deconstructed.lattice().matrix() - prim.matrix()).norm() < 1e-9);
        for b in 0..2 {
            // (the first image may have been wrapped by a lattice vector)
            let expected = original.fracs()[b] + prim.cart_to_frac(&scel.frac_to_cart(&shift));
            let diff = (deconstructed.fracs()[b] - expected).map(|x| x - x.round());
            assert_close(&diff, &Vector3::zeros());
        }

        // test error on unequal shifts
        let (lattice, mut fracs, meta) = supercell.into_parts();
        fracs[4][1] += 1e-6;
        match token.deconstruct(1e-10, Structure::new(lattice.clone(), fracs.clone(), meta.clone())) {
            Err(DeconstructError::BigDisplacement { site: 0, .. }) => {},
            r => panic!("unexpected: {:?}", r),
        }
        fracs.pop();
        match token.deconstruct(1e-10, Structure::new(lattice, fracs, meta[1..].to_vec())) {
            Err(DeconstructError::WrongSiteCount { num_sites: 11, num_cells: 6 }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn factor_group() {
        let prim = Lattice::cubic(1.0);
        let point_group = crate::generate_finite_group(
            &[
                FracOp::from_rot(&IMat3::new(0, -1, 0, 1, 0, 0, 0, 0, 1)),
                FracOp::from_rot(&IMat3::new(0, 0, 1, 1, 0, 0, 0, 1, 0)),
                FracOp::from_rot(&-IMat3::identity()),
            ],
            |a, b| a.then(b),
        );
        let ops: Vec<_> = point_group.iter().map(|op| op.to_cart(&prim)).collect();

        // tetragonal supercell keeps the 16 operations that preserve the z axis
        let scel = prim.linear_combination(&IMat3::from_diagonal(&IVec3::new(2, 2, 1)));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        let factor_group = expand_factor_group(&grid, &ops, &GridSettings::default());
        assert_eq!(factor_group.len(), 16 * 4);

        for op in &factor_group {
            let frac = scel.cart_to_frac(&op.trans);
            assert!(frac.iter().all(|&x| 0.0 <= x && x < 1.0), "{:?}", frac);
        }

        // the pure translations are all present
        let mut translations: Vec<_> = factor_group.iter()
            .filter(|op| op.rot == Matrix3::identity())
            .map(|op| grid.find_cart(&op.trans))
            .collect();
        translations.sort();
        assert_eq!(translations, vec![0, 1, 2, 3]);
    }
}
