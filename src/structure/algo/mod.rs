pub(crate) mod grid;
pub(crate) mod basis_perm;
pub(crate) mod perm_rep;
pub(crate) mod group;
pub(crate) mod supercell;
