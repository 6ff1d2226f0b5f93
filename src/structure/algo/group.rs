/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::hash::Hash;
use std::sync::Arc;

use crate::{CartOp, Perm, PrimGrid, Structure};
use crate::{BasisPermRep, PermRepCache, GridSettings};
use crate::{PositionMatchError, SymmetryError};

// NOTE: Currently there is no "group" trait, for a couple of reasons:
//
// * Many groups will depend on some form of context, which is awkward
//   to work into a trait (but trivial to add to a closure).
// * Making the group operation as part of the type hides some
//   potentially important considerations.  A type may have multiple
//   possible choices of the group operator, and use of a homomorphism
//   requires selecting the right one.

/// Generates a finite group from a non-empty set of generators.
///
/// The generators may contain duplicates or extraneous elements.
///
/// The order of the output is arbitrary, but consistent for
/// inputs that are related by a group isomorphism.
pub fn generate_finite_group<G>(
    generators: &[G],
    mut g_fn: impl FnMut(&G, &G) -> G,
) -> Vec<G>
where G: Hash + Eq + Clone,
{
    use std::collections::{HashSet, VecDeque};
    assert!(!generators.is_empty(), "empty groups do not exist!");

    let mut seen = HashSet::new();
    let mut out = vec![];

    let mut queue: VecDeque<_> = generators.iter().cloned().collect();

    while let Some(g) = queue.pop_front() {
        if seen.insert(g.clone()) {
            queue.extend(generators.iter().map(|h| g_fn(&g, h)));
            out.push(g);
        }
    }
    out
}

/// A list of symmetry operations of a primitive structure, along with
/// the data needed to build their permutation representations.
///
/// Representations built from this group are memoized on the group itself.
#[derive(Debug, Clone)]
pub struct SymGroup {
    ops: Vec<CartOp>,
    basis_perms: Option<BasisPermRep>,
    cache: PermRepCache,
}

impl SymGroup {
    /// A group with no basis permutation representation.
    ///
    /// Only translation permutations are available until one is attached
    /// with [`SymGroup::with_basis_perms`].
    pub fn new(ops: Vec<CartOp>) -> Self
    { SymGroup { ops, basis_perms: None, cache: PermRepCache::new() } }

    /// Find the action of every operation on the sites of `prim`.
    pub fn from_structure<M: PartialEq>(
        prim: &Structure<M>,
        ops: Vec<CartOp>,
        settings: &GridSettings,
    ) -> Result<Self, PositionMatchError> {
        let basis_perms = BasisPermRep::from_structure(prim, &ops, settings.position_tol)?;
        Ok(SymGroup::new(ops).with_basis_perms(basis_perms))
    }

    /// # Panics
    ///
    /// Panics if the representation has a different number of operations.
    pub fn with_basis_perms(mut self, basis_perms: BasisPermRep) -> Self {
        assert_eq!(
            basis_perms.len(), self.ops.len(),
            "basis permutation representation has the wrong number of operations",
        );
        self.basis_perms = Some(basis_perms);
        self.cache.clear();
        self
    }

    pub fn ops(&self) -> &[CartOp]
    { &self.ops }

    pub fn len(&self) -> usize
    { self.ops.len() }

    pub fn is_empty(&self) -> bool
    { self.ops.is_empty() }

    pub fn basis_perms(&self) -> Option<&BasisPermRep>
    { self.basis_perms.as_ref() }

    /// The permutation of the sites of a supercell induced by each operation.
    ///
    /// Sites are indexed as `l + b * grid.size()`, for each of the `NB`
    /// sites `b` of the primitive structure.
    pub fn site_permutations(
        &mut self,
        grid: &PrimGrid<'_>,
        settings: &GridSettings,
    ) -> Result<Arc<[Perm]>, SymmetryError> {
        let SymGroup { ops, basis_perms, cache } = self;
        match basis_perms.as_ref() {
            Some(basis) => cache.group_permutations(grid, ops, basis, basis.num_sites(), settings),
            None if ops.is_empty() => Ok(Vec::new().into()),
            None => Err(SymmetryError::MissingBasisPermutation { op_index: 0 }),
        }
    }

    /// The permutations induced by each translation of the grid, for `nb` sites per cell.
    ///
    /// Indexed by the flat index of the translation.
    pub fn translation_permutations(&mut self, grid: &PrimGrid<'_>, nb: usize) -> Arc<[Perm]>
    { self.cache.translation_permutations(grid, nb) }

    /// Number of memoized representations.
    pub fn num_cached(&self) -> usize
    { self.cache.len() }
}
