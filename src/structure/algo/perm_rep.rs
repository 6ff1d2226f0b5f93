/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Permutation representations of symmetry operations on the sites of a supercell.
//!
//! Sites are indexed as `l + b * grid.size()`, where `l` is a flat grid index
//! and `b` is the sublattice.  The permutation for an operation `g` sends the
//! site at `x` to the site at `g(x)` (modulo the supercell), so that site data
//! permuted by it follows the operation:
//!
//! ```text
//! new_data[g(x)] = old_data[x]
//! ```
//!
//! In pull form (`Perm::into_vec`, a.k.a. `ipermute`) this reads
//! `new_data[l] = old_data[ipermute[l]]`.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use std::collections::HashMap;
use std::sync::Arc;

use primgrid_linalg::{IMat3, IVec3};

use crate::{PrimGrid, UnitCellCoord, CanonicalCoord, CartOp, Perm};
use crate::{BasisPermuteLookup, GridSettings, Threading, SymmetryError};

/// One permutation per operation in `ops`, each on `nb * grid.size()` sites.
///
/// `ops` must be symmetries of the primitive structure that `basis` describes,
/// and `basis` must have an entry of length `nb` for every operation.
///
/// Operations are processed in parallel when `settings.threading` permits.
pub fn group_permutations<B>(
    grid: &PrimGrid<'_>,
    ops: &[CartOp],
    basis: &B,
    nb: usize,
    settings: &GridSettings,
) -> Result<Vec<Perm>, SymmetryError>
where B: BasisPermuteLookup + Sync + ?Sized,
{
    let compute = |(op_index, op): (usize, &CartOp)| {
        op_permutation(grid, op_index, op, basis.basis_permute(op_index), nb, settings.int_tol)
    };

    match settings.threading {
        #[cfg(feature = "rayon")]
        Threading::Rayon => ops.par_iter().enumerate().map(compute).collect(),
        _ => ops.iter().enumerate().map(compute).collect(),
    }
}

fn op_permutation(
    grid: &PrimGrid<'_>,
    op_index: usize,
    op: &CartOp,
    basis_images: Option<&[UnitCellCoord]>,
    nb: usize,
    int_tol: f64,
) -> Result<Perm, SymmetryError> {
    let images = basis_images.ok_or(SymmetryError::MissingBasisPermutation { op_index })?;
    if images.len() != nb {
        return Err(SymmetryError::BasisPermutationLength { op_index, expected: nb, actual: images.len() });
    }

    let mut sublat_seen = vec![false; nb];
    let mut new_sublats = Vec::with_capacity(nb);
    for (site, image) in images.iter().enumerate() {
        match image.sublat {
            Some(sublat) if sublat < nb => {
                if std::mem::replace(&mut sublat_seen[sublat], true) {
                    return Err(SymmetryError::NonBijectiveBasisPermutation { op_index, sublat });
                }
                new_sublats.push(sublat);
            },
            sublat => {
                return Err(SymmetryError::BadSublattice { op_index, site, sublat, num_sublats: nb });
            },
        }
    }

    let rot = op.frac_rot(grid.prim_lattice(), int_tol)
        .map_err(|cause| SymmetryError::NonIntegerRotation { op_index, cause })?;
    if !grid.is_symmetry_of_supercell(&rot) {
        return Err(SymmetryError::NonInvariantSupercell { op_index });
    }

    let rot_mnp = grid.matrix_u_inv() * rot * grid.matrix_u();
    trace!("symmetry operation {}: fractional rotation {:?}, canonical {:?}", op_index, rot, rot_mnp);

    let volume = grid.size();
    let mut dest = vec![0; nb * volume];
    for (old_sublat, (image, &new_sublat)) in images.iter().zip(&new_sublats).enumerate() {
        let shift = grid.to_canonical(image).mnp;
        for l in 0..volume {
            let mnp = rot_mnp * grid.canonical(l).mnp + shift;
            let new_l = grid.find_canonical(&CanonicalCoord { sublat: None, mnp });
            dest[l + old_sublat * volume] = new_l + new_sublat * volume;
        }
    }
    Ok(Perm::from_dest_unchecked(dest))
}

/// One permutation per flat index `shift_l`, for the translation by `grid.uccoord(shift_l)`.
///
/// Each acts on `nb * grid.size()` sites, moving every sublattice identically.
/// The permutation at `shift_l = 0` is the identity.
pub fn translation_permutations(grid: &PrimGrid<'_>, nb: usize) -> Vec<Perm> {
    let volume = grid.size();
    let mnps: Vec<IVec3> = (0..volume).map(|l| grid.canonical(l).mnp).collect();
    let sublats = Perm::eye(nb);

    mnps.iter()
        .map(|shift| {
            let dest = mnps.iter()
                .map(|mnp| grid.find_canonical(&CanonicalCoord { sublat: None, mnp: mnp + shift }))
                .collect();
            Perm::from_dest_unchecked(dest).with_outer(&sublats)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RepKind { Group, Translation }

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RepKey {
    kind: RepKind,
    // bit patterns of the primitive lattice matrix
    prim: [u64; 9],
    trans: IMat3,
    u: IMat3,
    diag: [i64; 3],
    nb: usize,
}

impl RepKey {
    fn new(kind: RepKind, grid: &PrimGrid<'_>, nb: usize) -> Self {
        let mut prim = [0; 9];
        for (bits, &x) in prim.iter_mut().zip(grid.prim_lattice().matrix().iter()) {
            *bits = x.to_bits();
        }
        RepKey {
            kind,
            prim,
            trans: *grid.trans_mat(),
            u: *grid.matrix_u(),
            diag: grid.diag_s(),
            nb,
        }
    }
}

/// Memoized permutation representations.
///
/// Entries are keyed on the grid's primitive lattice, transformation matrix
/// and canonical basis, and on `nb`.  Group representations are additionally assumed to all come
/// from the same list of operations on the same primitive structure, so a
/// cache used for those should be owned by whatever owns the operations
/// (see `SymGroup`).
#[derive(Debug, Clone, Default)]
pub struct PermRepCache {
    reps: HashMap<RepKey, Arc<[Perm]>>,
}

impl PermRepCache {
    pub fn new() -> Self
    { Default::default() }

    pub fn len(&self) -> usize
    { self.reps.len() }

    pub fn is_empty(&self) -> bool
    { self.reps.is_empty() }

    pub fn clear(&mut self)
    { self.reps.clear() }

    /// Memoized [`translation_permutations`].
    pub fn translation_permutations(&mut self, grid: &PrimGrid<'_>, nb: usize) -> Arc<[Perm]> {
        self.reps.entry(RepKey::new(RepKind::Translation, grid, nb))
            .or_insert_with(|| translation_permutations(grid, nb).into())
            .clone()
    }

    /// Memoized [`group_permutations`].  Errors are not cached.
    pub(crate) fn group_permutations<B>(
        &mut self,
        grid: &PrimGrid<'_>,
        ops: &[CartOp],
        basis: &B,
        nb: usize,
        settings: &GridSettings,
    ) -> Result<Arc<[Perm]>, SymmetryError>
    where B: BasisPermuteLookup + Sync + ?Sized,
    {
        let key = RepKey::new(RepKind::Group, grid, nb);
        if let Some(rep) = self.reps.get(&key) {
            return Ok(rep.clone());
        }
        let rep: Arc<[Perm]> = group_permutations(grid, ops, basis, nb, settings)?.into();
        self.reps.insert(key, rep.clone());
        Ok(rep)
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::{FracOp, Lattice, Permute};
    use crate::generate_finite_group;
    use nalgebra::{Matrix3, Vector3};
    use std::collections::HashMap;

    fn frac_rot(m: [[i64; 3]; 3]) -> FracOp {
        FracOp::from_rot(&IMat3::from_fn(|r, c| m[r][c]))
    }

    fn cubic_point_group() -> Vec<FracOp> {
        let generators = vec![
            frac_rot([[0, -1, 0], [1, 0, 0], [0, 0, 1]]),
            frac_rot([[0, 0, 1], [1, 0, 0], [0, 1, 0]]),
            frac_rot([[-1, 0, 0], [0, -1, 0], [0, 0, -1]]),
        ];
        generate_finite_group(&generators, |a, b| a.then(b))
    }

    // One site per cell, so every operation fixes sublattice 0 with no shift.
    fn trivial_basis(num_ops: usize) -> Vec<Vec<UnitCellCoord>> {
        vec![vec![UnitCellCoord::new(0, 0, 0, 0)]; num_ops]
    }

    fn serial() -> GridSettings {
        GridSettings { threading: Threading::Serial, ..Default::default() }
    }

    fn is_bijection(perm: &Perm, len: usize) -> bool {
        let mut pull = perm.clone().into_vec();
        pull.sort();
        perm.len() == len && pull == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn half_turn_squares_to_identity() {
        let prim = Lattice::eye();
        let scel = prim.linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(&prim, &scel).unwrap();

        let half_turn = CartOp::from_rot(Matrix3::from_diagonal(&Vector3::new(-1.0, -1.0, 1.0)));
        let perms = group_permutations(&grid, &[half_turn], &trivial_basis(1)[..], 1, &serial()).unwrap();
        assert_eq!(perms.len(), 1);
        assert!(is_bijection(&perms[0], 8));
        assert!(perms[0].then(&perms[0]).is_identity());

        // in a 2x2x2 cell, -1 == 1, so the half turn fixes every cell
        assert!(perms[0].is_identity());
    }

    #[test]
    fn quarter_turn_in_three_by_three() {
        let prim = Lattice::eye();
        let scel = prim.linear_combination(&(IMat3::identity() * 3));
        let grid = PrimGrid::new(&prim, &scel).unwrap();

        let quarter = frac_rot([[0, -1, 0], [1, 0, 0], [0, 0, 1]]).to_cart(&prim);
        let perm = group_permutations(&grid, &[quarter], &trivial_basis(1), 1, &serial()).unwrap().remove(0);
        assert!(!perm.is_identity());
        let half = perm.then(&perm);
        assert!(!half.is_identity());
        assert!(half.then(&half).is_identity());

        // (1, 0, 0) is sent to (0, 1, 0)
        let from = grid.find(&UnitCellCoord::from_cell(1, 0, 0));
        let to = grid.find(&UnitCellCoord::from_cell(0, 1, 0));
        assert_eq!(perm.image(from), to);
        assert_eq!(perm.into_vec()[to], from);
    }

    #[test]
    fn cubic_group_composition() {
        let prim = Lattice::cubic(1.5);
        let scel = prim.linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(&prim, &scel).unwrap();

        let frac_ops = cubic_point_group();
        assert_eq!(frac_ops.len(), 48);
        let cart_ops: Vec<_> = frac_ops.iter().map(|op| op.to_cart(&prim)).collect();
        let perms = group_permutations(&grid, &cart_ops, &trivial_basis(48), 1, &Default::default()).unwrap();

        let index_of: HashMap<_, _> = frac_ops.iter().cloned().enumerate().map(|(i, op)| (op, i)).collect();
        for (a, op_a) in frac_ops.iter().enumerate() {
            assert!(is_bijection(&perms[a], 8));
            for (b, op_b) in frac_ops.iter().enumerate() {
                let ab = index_of[&op_a.then(op_b)];
                assert_eq!(perms[a].then(&perms[b]), perms[ab]);
            }
        }
    }

    #[test]
    fn nondiagonal_supercell_composition() {
        let prim = Lattice::cubic(1.0);
        // a supercell that is invariant only under the operations preserving z
        let scel = prim.linear_combination(&IMat3::new(
            1, 1, 0,
            1, -1, 0,
            0, 0, 3,
        ));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        assert_eq!(grid.size(), 6);

        let frac_ops: Vec<_> = cubic_point_group().into_iter()
            .filter(|op| op.rot()[(2, 2)] != 0)
            .collect();
        assert_eq!(frac_ops.len(), 16);
        let cart_ops: Vec<_> = frac_ops.iter().map(|op| op.to_cart(&prim)).collect();
        let perms = group_permutations(&grid, &cart_ops, &trivial_basis(16), 1, &Default::default()).unwrap();

        let index_of: HashMap<_, _> = frac_ops.iter().cloned().enumerate().map(|(i, op)| (op, i)).collect();
        for (a, op_a) in frac_ops.iter().enumerate() {
            for (b, op_b) in frac_ops.iter().enumerate() {
                assert_eq!(perms[a].then(&perms[b]), perms[index_of[&op_a.then(op_b)]]);
            }
        }

        // a threefold axis along [111] does not preserve this supercell
        let threefold = frac_rot([[0, 0, 1], [1, 0, 0], [0, 1, 0]]).to_cart(&prim);
        match group_permutations(&grid, &[threefold], &trivial_basis(1), 1, &serial()) {
            Err(SymmetryError::NonInvariantSupercell { op_index: 0 }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn two_sublattices() {
        // CsCl-like: an inversion swaps no sublattices but shifts the second one
        let prim = Lattice::cubic(1.0);
        let scel = prim.linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(&prim, &scel).unwrap();

        let inversion = CartOp::from_rot(-Matrix3::identity());
        let basis = vec![vec![UnitCellCoord::new(0, 0, 0, 0), UnitCellCoord::new(1, -1, -1, -1)]];
        let perm = group_permutations(&grid, &[inversion], &basis, 2, &serial()).unwrap().remove(0);
        assert!(is_bijection(&perm, 16));

        // sublattice 0 is fixed (-n == n mod 2) while sublattice 1 is shifted by (-1, -1, -1)
        for l in 0..8 {
            assert_eq!(perm.image(l), l);
            let shifted = grid.find(&(grid.uccoord(l) + IVec3::new(-1, -1, -1)));
            assert_eq!(perm.image(l + 8), shifted + 8);
        }
        // sites are relabeled consistently with the data they carry
        let data: Vec<_> = (0..16).collect();
        let moved = data.permuted_by(&perm);
        assert_eq!(moved[grid.find(&UnitCellCoord::from_cell(1, 1, 1)) + 8], 8);
    }

    #[test]
    fn basis_errors() {
        let prim = Lattice::eye();
        let scel = prim.linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        let ops = vec![CartOp::eye(), CartOp::eye()];
        let settings = serial();

        let missing: Vec<Option<Vec<UnitCellCoord>>> = vec![Some(vec![UnitCellCoord::new(0, 0, 0, 0)]), None];
        match group_permutations(&grid, &ops, &missing, 1, &settings) {
            Err(SymmetryError::MissingBasisPermutation { op_index: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        let short = trivial_basis(1);
        match group_permutations(&grid, &ops, &short, 1, &settings) {
            Err(SymmetryError::MissingBasisPermutation { op_index: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        match group_permutations(&grid, &ops, &trivial_basis(2), 2, &settings) {
            Err(SymmetryError::BasisPermutationLength { op_index: 0, expected: 2, actual: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        let unset = vec![vec![UnitCellCoord::from_cell(0, 0, 0)]; 2];
        match group_permutations(&grid, &ops, &unset, 1, &settings) {
            Err(SymmetryError::BadSublattice { sublat: None, .. }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        let doubled = vec![vec![UnitCellCoord::new(1, 0, 0, 0), UnitCellCoord::new(1, 0, 0, 0)]; 2];
        match group_permutations(&grid, &ops, &doubled, 2, &settings) {
            Err(SymmetryError::NonBijectiveBasisPermutation { op_index: 0, sublat: 1 }) => {},
            r => panic!("unexpected: {:?}", r),
        }

        let skew = CartOp::from_rot(Matrix3::new(
            1.0, 0.5, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        ));
        match group_permutations(&grid, &[skew], &trivial_basis(1), 1, &settings) {
            Err(SymmetryError::NonIntegerRotation { op_index: 0, .. }) => {},
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn translations() {
        let prim = Lattice::eye();
        let scel = prim.linear_combination(&IMat3::new(
            2, 1, 0,
            0, 3, 0,
            1, 0, 2,
        ));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        let volume = grid.size();
        let nb = 3;
        let perms = translation_permutations(&grid, nb);
        assert_eq!(perms.len(), volume);
        assert_eq!(grid.find(&UnitCellCoord::from_cell(0, 0, 0)), 0);
        assert!(perms[0].is_identity());

        for (shift_l, perm) in perms.iter().enumerate() {
            assert!(is_bijection(perm, nb * volume));
            let shift = grid.uccoord(shift_l).cell;
            for b in 0..nb {
                for l in 0..volume {
                    let expected = grid.find(&(grid.uccoord(l) + shift));
                    assert_eq!(perm.image(l + b * volume), expected + b * volume);
                }
            }
        }

        // the translations form a group under composition
        for a in 0..volume {
            for b in 0..volume {
                let sum = grid.uccoord(a) + grid.uccoord(b).cell;
                assert_eq!(perms[a].then(&perms[b]), perms[grid.find(&sum)]);
            }
        }
    }

    #[test]
    fn cache() {
        let prim = Lattice::eye();
        let scel = prim.linear_combination(&(IMat3::identity() * 2));
        let grid = PrimGrid::new(&prim, &scel).unwrap();
        let mut cache = PermRepCache::new();

        let a = cache.translation_permutations(&grid, 1);
        let b = cache.translation_permutations(&grid, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.translation_permutations(&grid, 2);
        assert_eq!(c.len(), 8);
        assert_eq!(c[1].len(), 16);
        assert_eq!(cache.len(), 2);

        let ops = vec![CartOp::eye()];
        let g = cache.group_permutations(&grid, &ops, &trivial_basis(1), 1, &serial()).unwrap();
        assert!(g[0].is_identity());
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_distinguishes_primitive_lattices() {
        // same T = 3I (hence the same U and S) on two different primitive lattices
        let square = Lattice::eye();
        let sheared = Lattice::from_vectors(&[
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        let square_scel = square.linear_combination(&(IMat3::identity() * 3));
        let sheared_scel = sheared.linear_combination(&(IMat3::identity() * 3));
        let square_grid = PrimGrid::new(&square, &square_scel).unwrap();
        let sheared_grid = PrimGrid::new(&sheared, &sheared_scel).unwrap();
        assert_eq!(square_grid.trans_mat(), sheared_grid.trans_mat());
        assert_eq!(square_grid.matrix_u(), sheared_grid.matrix_u());

        // a quarter turn about z is a symmetry of both, with different fractional rotations
        let quarter = CartOp::from_rot(Matrix3::new(
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ));
        let ops = vec![quarter];
        let basis = trivial_basis(1);
        let mut cache = PermRepCache::new();

        let on_square = cache.group_permutations(&square_grid, &ops, &basis, 1, &serial()).unwrap();
        let on_sheared = cache.group_permutations(&sheared_grid, &ops, &basis, 1, &serial()).unwrap();
        assert_eq!(cache.len(), 2);
        assert_ne!(on_square[0], on_sheared[0]);
        assert_eq!(on_sheared.to_vec(), group_permutations(&sheared_grid, &ops, &basis, 1, &serial()).unwrap());

        // a, in units of (a, b): the image b - a == (-1, 1, 0) == (2, 1, 0)
        let a = sheared_grid.find(&UnitCellCoord::from_cell(1, 0, 0));
        assert_eq!(on_sheared[0].image(a), sheared_grid.find(&UnitCellCoord::from_cell(2, 1, 0)));
    }
}
