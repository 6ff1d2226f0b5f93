/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::fmt;
use std::ops::Add;

use nalgebra::Vector3;
use primgrid_linalg::IVec3;

// NOTE: The two coordinate types below hold exactly the same data.  They are
//       kept distinct because mixing them up is silent and catastrophic: every
//       index computed from a wrongly-interpreted triple is still a valid index.
//
//       Only `PrimGrid` converts between them, because the conversion depends
//       on the grid's choice of canonical basis.

/// A sublattice index paired with an integer translation, in *natural*
/// coordinates (units of the primitive lattice vectors).
///
/// The sublattice index is opaque to the grid; it is passed through untouched,
/// and is unset (`None`) on coordinates produced by the grid itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UnitCellCoord {
    pub sublat: Option<usize>,
    pub cell: IVec3,
}

/// A sublattice index paired with an integer translation in the grid's
/// *canonical* basis (the columns of the SNF left factor `U`).
///
/// Canonical coordinates produced by a grid always lie in `[0, S0) x [0, S1) x [0, S2)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalCoord {
    pub sublat: Option<usize>,
    pub mnp: IVec3,
}

impl UnitCellCoord {
    pub fn new(sublat: usize, i: i64, j: i64, k: i64) -> Self
    { UnitCellCoord { sublat: Some(sublat), cell: IVec3::new(i, j, k) } }

    /// A translation with no sublattice.
    pub fn from_cell(i: i64, j: i64, k: i64) -> Self
    { UnitCellCoord { sublat: None, cell: IVec3::new(i, j, k) } }

    pub fn with_sublat(self, sublat: usize) -> Self
    { UnitCellCoord { sublat: Some(sublat), ..self } }

    pub fn without_sublat(self) -> Self
    { UnitCellCoord { sublat: None, ..self } }

    /// The translation as a float vector, in fractional coordinates of the primitive lattice.
    pub fn cell_frac(&self) -> Vector3<f64>
    { self.cell.map(|x| x as f64) }
}

impl CanonicalCoord {
    pub fn new(sublat: Option<usize>, m: i64, n: i64, p: i64) -> Self
    { CanonicalCoord { sublat, mnp: IVec3::new(m, n, p) } }
}

/// Translation by a lattice vector.
impl Add<IVec3> for UnitCellCoord {
    type Output = UnitCellCoord;

    fn add(self, other: IVec3) -> UnitCellCoord
    { UnitCellCoord { sublat: self.sublat, cell: self.cell + other } }
}

impl fmt::Display for UnitCellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sublat {
            Some(b) => write!(f, "({}, ", b)?,
            None => write!(f, "(-, ")?,
        }
        write!(f, "{}, {}, {})", self.cell[0], self.cell[1], self.cell[2])
    }
}
