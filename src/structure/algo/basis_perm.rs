/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::Vector3;
use primgrid_linalg::IVec3;

use crate::{CartOp, Lattice, Structure, UnitCellCoord};
use crate::PositionMatchError;

/// Tells how each symmetry operation acts on the sites of a primitive cell.
///
/// Entry `b` of `basis_permute(op_index)` is the image of primitive site `b`
/// under the operation, as a sublattice index together with the primitive
/// cell translation it lands in.  That is, for an operation `x -> R x + t`,
///
/// ```text
/// R p[b] + t == p[b'] + delta      (in fractional coordinates)
/// ```
///
/// where `(b', delta)` is the `b`th entry.
pub trait BasisPermuteLookup {
    /// `None` if nothing is known about the operation.
    fn basis_permute(&self, op_index: usize) -> Option<&[UnitCellCoord]>;
}

impl BasisPermuteLookup for [Vec<UnitCellCoord>] {
    fn basis_permute(&self, op_index: usize) -> Option<&[UnitCellCoord]>
    { self.get(op_index).map(|v| &v[..]) }
}

impl BasisPermuteLookup for [Option<Vec<UnitCellCoord>>] {
    fn basis_permute(&self, op_index: usize) -> Option<&[UnitCellCoord]>
    { self.get(op_index)?.as_ref().map(|v| &v[..]) }
}

impl<L> BasisPermuteLookup for Vec<L>
where [L]: BasisPermuteLookup,
{
    fn basis_permute(&self, op_index: usize) -> Option<&[UnitCellCoord]>
    { self[..].basis_permute(op_index) }
}

/// The images of the sites of a primitive structure under each operation of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisPermRep {
    num_sites: usize,
    images: Vec<Vec<UnitCellCoord>>,
}

impl BasisPermRep {
    /// Find the image of every site under every operation.
    ///
    /// Fails if any image matches no site of equal metadata within `tol`.
    pub fn from_structure<M: PartialEq>(
        prim: &Structure<M>,
        ops: &[CartOp],
        tol: f64,
    ) -> Result<Self, PositionMatchError> {
        let images = ops.iter().enumerate()
            .map(|(op_index, op)| {
                find_basis_permutation(prim, op, tol)
                    .map_err(|e| PositionMatchError { op_index, ..e })
            })
            .collect::<Result<_, _>>()?;
        Ok(BasisPermRep { num_sites: prim.num_sites(), images })
    }

    /// Number of sites in the primitive structure (the `NB` of the grid permutations).
    pub fn num_sites(&self) -> usize
    { self.num_sites }

    /// Number of operations.
    pub fn len(&self) -> usize
    { self.images.len() }

    pub fn is_empty(&self) -> bool
    { self.images.is_empty() }

    pub fn images(&self) -> &[Vec<UnitCellCoord>]
    { &self.images }
}

impl BasisPermuteLookup for BasisPermRep {
    fn basis_permute(&self, op_index: usize) -> Option<&[UnitCellCoord]>
    { self.images.basis_permute(op_index) }
}

/// Find the image `(b', delta)` of each site `b` of a primitive structure under `op`.
///
/// The returned error always has an `op_index` of zero.
///
/// Slow, and not always correct for extremely skewed cells. (candidate
/// images are only searched for in the 27 cells nearest to the naive image)
pub fn find_basis_permutation<M: PartialEq>(
    prim: &Structure<M>,
    op: &CartOp,
    tol: f64,
) -> Result<Vec<UnitCellCoord>, PositionMatchError> {
    let lattice = prim.lattice();
    let carts = prim.to_carts();

    carts.iter().zip(prim.meta()).enumerate()
        .map(|(site, (cart, meta))| {
            let image = lattice.cart_to_frac(&op.transform_cart(cart));
            let found = prim.fracs().iter().zip(prim.meta()).enumerate()
                .filter(|&(_, (_, other_meta))| other_meta == meta)
                .find_map(|(sublat, (frac, _))| {
                    nearest_image(lattice, &(image - frac), tol)
                        .map(|cell| UnitCellCoord { sublat: Some(sublat), cell })
                });

            found.ok_or_else(|| PositionMatchError { op_index: 0, site, image, tol })
        })
        .collect()
}

// The lattice point within cartesian distance `tol` of a fractional vector, if any.
fn nearest_image(lattice: &Lattice, frac: &Vector3<f64>, tol: f64) -> Option<IVec3> {
    let rounded = frac.map(|x| x.round());
    let remainder = frac - rounded;

    iproduct!(-1..=1, -1..=1, -1..=1)
        .map(|(a, b, c)| IVec3::new(a, b, c))
        .map(|offset| {
            let dist = lattice.frac_to_cart(&(remainder - offset.map(|x| x as f64))).norm();
            (offset, dist)
        })
        .filter(|&(_, dist)| dist < tol)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(offset, _)| rounded.map(|x| x as i64) + offset)
}
