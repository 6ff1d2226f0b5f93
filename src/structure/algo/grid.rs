/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::Vector3;
use num_integer::Integer;
use primgrid_linalg::{IMat3, IVec3, Tol};

use crate::{Lattice, UnitCellCoord, CanonicalCoord, CartOp};
use crate::{GridError, GridSettings};

/// Which lattice a set of fractional coordinates is relative to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CellKind {
    Prim,
    Scel,
}

/// The position of a site, as returned by [`PrimGrid::coord`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SiteCoord {
    pub cart: Vector3<f64>,
    /// Fractional coordinates in the requested frame.
    pub frac: Vector3<f64>,
}

/// An enumeration of the primitive cell translations inside a supercell.
///
/// Every translation of the primitive lattice is equivalent (modulo the
/// supercell lattice) to exactly one of `size()` representatives, and each
/// representative is assigned a flat index in `0..size()`.
///
/// # The canonical basis
///
/// Given the integer matrix `T` whose columns are the supercell vectors in units
/// of the primitive vectors, a Smith Normal Form `T = U S V` gives a basis
/// (the columns of `U`) in which the supercell lattice is simply `S Z^3`.
/// Canonical coordinates `(m, n, p)` are taken in this basis and reduced into
/// `[0, S0) x [0, S1) x [0, S2)`, which makes flattening trivial:
///
/// ```text
/// l = m + n * S0 + p * S0 * S1
/// ```
///
/// The grid borrows both lattices; it is cheap to build and immutable once built.
#[derive(Debug, Clone)]
pub struct PrimGrid<'a> {
    prim: &'a Lattice,
    scel: &'a Lattice,
    floor_tol: f64,

    trans: IMat3,
    u: IMat3,
    u_inv: IMat3,
    diag: [i64; 3],
    stride: [i64; 2],
    volume: i64,

    // sign(det T) * adj(T), i.e. volume * T^-1.
    plane: IMat3,
}

impl<'a> PrimGrid<'a> {
    /// Build a grid with the default settings.
    pub fn new(prim: &'a Lattice, scel: &'a Lattice) -> Result<Self, GridError>
    { Self::with_settings(prim, scel, &GridSettings::default()) }

    pub fn with_settings(
        prim: &'a Lattice,
        scel: &'a Lattice,
        settings: &GridSettings,
    ) -> Result<Self, GridError> {
        let trans = integer_transformation(prim, scel, settings.int_tol)?;
        let snf = primgrid_linalg::smith_normal_form(&trans);
        debug!("grid transformation {:?} has Smith form {:?}", trans, snf);

        Ok(Self::from_parts(prim, scel, settings, trans, snf.u, snf.u_inv, snf.diag))
    }

    /// Build a grid that uses a specific canonical basis.
    ///
    /// This is needed to keep indices comparable between two grids, e.g.
    /// between a supercell and its image under a symmetry operation.
    /// `u` and `diag` will usually come from [`PrimGrid::matrix_u`]
    /// and [`PrimGrid::diag_s`] of the other grid.
    ///
    /// Zeros in `diag` are replaced by `1` (the axis holds a single value).
    /// Fails unless `u` is unimodular and `U S` generates the supercell lattice.
    pub fn with_basis(
        prim: &'a Lattice,
        scel: &'a Lattice,
        u: &IMat3,
        diag: [i64; 3],
        settings: &GridSettings,
    ) -> Result<Self, GridError> {
        let trans = integer_transformation(prim, scel, settings.int_tol)?;
        let diag = [0, 1, 2].map(|k| match diag[k] { 0 => 1, x => x.abs() });

        let inconsistent = |reason| GridError::InconsistentBasis { u: *u, diag, trans, reason };

        let u_inv = primgrid_linalg::unimodular_inverse(u).ok_or_else(|| inconsistent("U is not unimodular"))?;
        if diag.iter().product::<i64>() != primgrid_linalg::det(&trans).abs() {
            return Err(inconsistent("the product of S does not equal |det T|"));
        }
        // T = U S V for some integer V
        let s_v = u_inv * trans;
        for (row, &s) in diag.iter().enumerate() {
            if s_v.row(row).iter().any(|x| x % s != 0) {
                return Err(inconsistent("U^-1 T is not divisible by S"));
            }
        }
        debug!("grid transformation {:?} with forced basis U = {:?}, S = {:?}", trans, u, diag);

        Ok(Self::from_parts(prim, scel, settings, trans, *u, u_inv, diag))
    }

    fn from_parts(
        prim: &'a Lattice,
        scel: &'a Lattice,
        settings: &GridSettings,
        trans: IMat3,
        u: IMat3,
        u_inv: IMat3,
        diag: [i64; 3],
    ) -> Self {
        let volume = diag[0] * diag[1] * diag[2];
        let plane = primgrid_linalg::adjugate(&trans) * primgrid_linalg::det(&trans).signum();
        PrimGrid {
            prim, scel,
            floor_tol: settings.floor_tol,
            trans, u, u_inv, diag,
            stride: [diag[0], diag[0] * diag[1]],
            volume,
            plane,
        }
    }
}

// Rounds the primitive-to-supercell basis change to integers.
fn integer_transformation(prim: &Lattice, scel: &Lattice, tol: f64) -> Result<IMat3, GridError> {
    let float = prim.transformation_to(scel);
    let rounded = primgrid_linalg::round_to_integer(&float);
    if primgrid_linalg::det(&rounded) == 0 {
        return Err(GridError::SingularTransformation { float, rounded });
    }
    Tol(tol).unfloat_m3(&float)
        .map_err(|_| GridError::NonIntegerTransformation { float, rounded, tol })
}

/// Accessors
impl<'a> PrimGrid<'a> {
    /// Number of primitive cells in the supercell.
    pub fn size(&self) -> usize
    { self.volume as usize }

    pub fn prim_lattice(&self) -> &'a Lattice
    { self.prim }

    pub fn scel_lattice(&self) -> &'a Lattice
    { self.scel }

    /// The integer matrix whose columns are the supercell vectors in units of the primitive vectors.
    pub fn trans_mat(&self) -> &IMat3
    { &self.trans }

    pub fn matrix_u(&self) -> &IMat3
    { &self.u }

    pub fn matrix_u_inv(&self) -> &IMat3
    { &self.u_inv }

    pub fn matrix_s(&self) -> IMat3
    { IMat3::from_diagonal(&self.diag.into()) }

    pub fn diag_s(&self) -> [i64; 3]
    { self.diag }

    /// `size() * T^-1`, an integer matrix.
    pub fn plane_mat(&self) -> &IMat3
    { &self.plane }

    /// `[S0, S0 * S1]`
    pub fn strides(&self) -> [i64; 2]
    { self.stride }
}

impl<'a> PrimGrid<'a> {
    /// The canonical coordinates of flat index `l`.
    ///
    /// # Panics
    ///
    /// Panics if `l >= size()`.
    pub fn canonical(&self, l: usize) -> CanonicalCoord {
        assert!(
            l < self.size(),
            "flat index {} is out of range 0..{}", l, self.size(),
        );
        let l = l as i64;
        let m = l % self.diag[0];
        let n = (l / self.stride[0]) % self.diag[1];
        let p = l / self.stride[1];
        CanonicalCoord::new(None, m, n, p)
    }

    /// The representative translation of flat index `l`, in natural coordinates.
    ///
    /// The sublattice is left unset.
    ///
    /// # Panics
    ///
    /// Panics if `l >= size()`.
    pub fn uccoord(&self, l: usize) -> UnitCellCoord
    { self.from_canonical(&self.canonical(l)) }

    /// Natural to canonical coordinates, reduced into range.  The sublattice is passed through.
    pub fn to_canonical(&self, coord: &UnitCellCoord) -> CanonicalCoord {
        let raw = self.u_inv * coord.cell;
        CanonicalCoord { sublat: coord.sublat, mnp: self.reduce_canonical(&raw) }
    }

    /// Canonical to natural coordinates, reduced into the supercell.  The sublattice is passed through.
    pub fn from_canonical(&self, coord: &CanonicalCoord) -> UnitCellCoord {
        let cell = self.u * coord.mnp;
        self.reduce_into_supercell(&UnitCellCoord { sublat: coord.sublat, cell })
    }

    /// The flat index of the translation `coord`, modulo the supercell.
    ///
    /// The sublattice is ignored.
    pub fn find(&self, coord: &UnitCellCoord) -> usize
    { self.flatten(&self.to_canonical(coord).mnp) }

    /// The flat index of canonical coordinates (which need not be reduced).
    pub fn find_canonical(&self, coord: &CanonicalCoord) -> usize
    { self.flatten(&self.reduce_canonical(&coord.mnp)) }

    /// The flat index of the primitive cell containing a point given in
    /// fractional coordinates of the primitive lattice.
    ///
    /// Points within `floor-tol` below a cell boundary are counted as
    /// belonging to the next cell.
    pub fn find_frac(&self, frac: &Vector3<f64>) -> usize {
        let cell = frac.map(|x| (x + self.floor_tol).floor() as i64);
        self.find(&UnitCellCoord { sublat: None, cell })
    }

    /// The flat index of the primitive cell containing a cartesian point.
    pub fn find_cart(&self, cart: &Vector3<f64>) -> usize
    { self.find_frac(&self.prim.cart_to_frac(cart)) }

    /// The unique equivalent translation inside the supercell.
    ///
    /// "Inside" means the fractional coordinates of the translation with
    /// respect to the supercell lattice lie in `[0, 1)`.  The sublattice is passed through.
    pub fn reduce_into_supercell(&self, coord: &UnitCellCoord) -> UnitCellCoord {
        // plane * n = volume * (n in supercell fractional coords), which is integral.
        let raw = (self.plane * coord.cell).map(|x| x.mod_floor(&self.volume));
        let scaled = self.trans * raw;
        debug_assert!(scaled.iter().all(|x| x % self.volume == 0));
        UnitCellCoord { sublat: coord.sublat, cell: scaled / self.volume }
    }

    /// The position of the representative of `l`.
    ///
    /// # Panics
    ///
    /// Panics if `l >= size()`.
    pub fn coord(&self, l: usize, frame: CellKind) -> SiteCoord {
        let prim_frac = self.uccoord(l).cell_frac();
        let cart = self.prim.frac_to_cart(&prim_frac);
        let frac = match frame {
            CellKind::Prim => prim_frac,
            CellKind::Scel => self.scel.cart_to_frac(&cart),
        };
        SiteCoord { cart, frac }
    }

    /// Test whether a point group operation (in fractional coordinates of the
    /// primitive lattice) maps the supercell lattice onto itself.
    pub fn is_symmetry_of_supercell(&self, frac_rot: &IMat3) -> bool {
        // iff T^-1 R T is integral
        let scaled = self.plane * frac_rot * self.trans;
        scaled.iter().all(|x| x % self.volume == 0)
    }

    /// The pure translation by `uccoord(l)`, as a cartesian operation.
    pub fn translation_op(&self, l: usize) -> CartOp
    { CartOp::from_trans(self.coord(l, CellKind::Prim).cart) }

    fn reduce_canonical(&self, mnp: &IVec3) -> IVec3
    { IVec3::from_fn(|k, _| mnp[k].mod_floor(&self.diag[k])) }

    fn flatten(&self, mnp: &IVec3) -> usize
    { (mnp[0] + mnp[1] * self.stride[0] + mnp[2] * self.stride[1]) as usize }
}
