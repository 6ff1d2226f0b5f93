/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::InvalidPermutationError;

/// A relabeling of the sites of a supercell.
///
/// A `Perm` records, for every site index `k`, the index [`Perm::image`]`(k)`
/// that the contents of site `k` are carried to.  This is how a symmetry
/// operation acts on an occupation array:
///
/// ```text
/// new_occ[perm.image(k)] = old_occ[k]
/// ```
///
/// The same permutation can be written down the other way around, as the
/// `ipermute` vector returned by [`Perm::into_vec`]:
///
/// ```text
/// new_occ[l] = old_occ[ipermute[l]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Perm {
    // dest[k] = image of site k
    dest: Vec<usize>,
}

impl Perm {
    pub fn eye(n: usize) -> Perm
    { Perm { dest: (0..n).collect() } }

    pub fn len(&self) -> usize
    { self.dest.len() }

    pub fn is_empty(&self) -> bool
    { self.dest.is_empty() }

    pub fn is_identity(&self) -> bool
    { self.dest.iter().enumerate().all(|(k, &d)| k == d) }

    /// Build from an `ipermute` vector, where `ipermute[l]` is the site whose
    /// contents end up at `l`.
    pub fn from_vec(ipermute: Vec<usize>) -> Result<Perm, InvalidPermutationError> {
        if !is_permutation(&ipermute) {
            return Err(InvalidPermutationError);
        }
        Ok(Perm { dest: invert(&ipermute) })
    }

    // `dest` must already be a bijection; checked only in debug builds.
    pub(crate) fn from_dest_unchecked(dest: Vec<usize>) -> Perm {
        debug_assert!(is_permutation(&dest), "(BUG) site map is not a bijection");
        Perm { dest }
    }

    /// The `ipermute` vector.
    pub fn into_vec(self) -> Vec<usize>
    { invert(&self.dest) }

    /// The site that the contents of site `k` are carried to.
    pub fn image(&self, k: usize) -> usize
    { self.dest[k] }

    #[must_use = "not an in-place operation"]
    pub fn inverted(&self) -> Perm
    { Perm { dest: invert(&self.dest) } }

    /// Apply `self`, then `next`.
    ///
    /// For the permutations of two symmetry operations, this is the
    /// permutation of the operation `op_self.then(op_next)`.
    pub fn then(&self, next: &Perm) -> Perm {
        assert_eq!(self.len(), next.len(), "Incorrect permutation length");
        Perm { dest: self.dest.iter().map(|&d| next.dest[d]).collect() }
    }

    /// Lift a permutation of the cells of a grid to sites with several sublattices.
    ///
    /// Sites are laid out in blocks of `self.len()` cells, one block per
    /// sublattice.  The site at cell `l` of sublattice `b` is carried to cell
    /// `self.image(l)` of sublattice `sublats.image(b)`.
    pub fn with_outer(&self, sublats: &Perm) -> Perm {
        let num_cells = self.len();
        let dest = sublats.dest.iter()
            .flat_map(|&b| self.dest.iter().map(move |&l| l + b * num_cells))
            .collect();
        Perm { dest }
    }
}

fn is_permutation(xs: &[usize]) -> bool {
    let mut hit = vec![false; xs.len()];
    xs.iter().all(|&x| match hit.get_mut(x) {
        Some(slot) => !std::mem::replace(slot, true),
        None => false,
    })
}

fn invert(dest: &[usize]) -> Vec<usize> {
    let mut out = vec![0; dest.len()];
    for (k, &d) in dest.iter().enumerate() {
        out[d] = k;
    }
    out
}

/// Data that can be relabeled by a [`Perm`].
///
/// `data.permuted_by(&a).permuted_by(&b)` must equal `data.permuted_by(&a.then(&b))`.
pub trait Permute: Sized {
    /// Returns the relabeled data.  `perm` must have one entry per item.
    fn permuted_by(self, perm: &Perm) -> Self;
}

impl<T> Permute for Vec<T> {
    fn permuted_by(self, perm: &Perm) -> Vec<T> {
        assert_eq!(self.len(), perm.len(), "Incorrect permutation length");

        let mut tagged: Vec<_> = perm.dest.iter().cloned().zip(self).collect();
        tagged.sort_unstable_by_key(|&(dest, _)| dest);
        tagged.into_iter().map(|(_, x)| x).collect()
    }
}
