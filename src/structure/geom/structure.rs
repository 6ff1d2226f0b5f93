/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::Vector3;

use crate::Lattice;
use crate::oper::{Perm, Permute};

/// A periodic structure: a lattice, fractional site positions, and per-site metadata.
///
/// This is deliberately minimal. Whatever the metadata means (elements,
/// allowed occupants, ...) is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure<M = ()> {
    pub(crate) lattice: Lattice,
    pub(crate) fracs: Vec<Vector3<f64>>,
    pub(crate) meta: Vec<M>,
}

impl Structure<()> {
    pub fn new_coords(lattice: Lattice, fracs: Vec<Vector3<f64>>) -> Self {
        let meta = vec![(); fracs.len()];
        Structure { lattice, fracs, meta }
    }
}

impl<M> Structure<M> {
    pub fn new(lattice: Lattice, fracs: Vec<Vector3<f64>>, meta: Vec<M>) -> Self {
        assert_eq!(fracs.len(), meta.len(), "number of sites and metadata differ");
        Structure { lattice, fracs, meta }
    }

    pub fn num_sites(&self) -> usize
    { self.fracs.len() }

    pub fn lattice(&self) -> &Lattice
    { &self.lattice }

    pub fn fracs(&self) -> &[Vector3<f64>]
    { &self.fracs }

    pub fn meta(&self) -> &[M]
    { &self.meta }

    pub fn to_carts(&self) -> Vec<Vector3<f64>>
    { self.fracs.iter().map(|f| self.lattice.frac_to_cart(f)).collect() }

    /// Wrap every fractional coordinate into `[0, 1)`.
    pub fn reduce_positions(&mut self) {
        for f in &mut self.fracs {
            *f = f.map(|x| x - x.floor());
        }
    }

    pub fn into_parts(self) -> (Lattice, Vec<Vector3<f64>>, Vec<M>)
    { (self.lattice, self.fracs, self.meta) }
}

impl<M> Permute for Structure<M> {
    fn permuted_by(self, perm: &Perm) -> Structure<M> {
        let Structure { lattice, fracs, meta } = self;
        Structure {
            lattice,
            fracs: fracs.permuted_by(perm),
            meta: meta.permuted_by(perm),
        }
    }
}
