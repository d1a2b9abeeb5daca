//! Plates, tipboxes and tipwastes together with the grid geometry they share.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::units::{Coordinates, Footprint, GEOMETRY_EPSILON};

pub use self::catalog::{LabwareCatalog, LabwareSpec};
pub use self::plate::{Plate, Well};
pub use self::tipbox::{Tip, TipSpec, Tipbox};
pub use self::tipwaste::Tipwaste;
pub use self::wellcoords::WellCoords;

pub mod catalog;
pub mod error;
pub mod plate;
pub mod tipbox;
pub mod tipwaste;
pub mod wellcoords;

/// The class of a labware instance, used by deck slots to decide what they accept.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabwareKind {
    Plate,
    Tipbox,
    Tipwaste,
}

impl Display for LabwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabwareKind::Plate => "plate",
            LabwareKind::Tipbox => "tipbox",
            LabwareKind::Tipwaste => "tipwaste",
        })
    }
}

/// Regular grid of wells or tip slots, positioned relative to the labware origin.
///
/// Columns advance along `x` and rows along `y`. `first_well` is the centre of `A1` with
/// `z` at the well bottom; `well_size` is the cross-section and depth of every well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub pitch: Coordinates,
    pub first_well: Coordinates,
    pub well_size: Coordinates,
}

impl Grid {
    pub fn contains(&self, wc: WellCoords) -> bool {
        wc.row < self.rows && wc.col < self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major index of `wc`, if it lies inside the grid.
    pub fn index(&self, wc: WellCoords) -> Option<usize> {
        self.contains(wc).then(|| wc.row * self.cols + wc.col)
    }

    /// Centre of the bottom of `wc` relative to the labware origin.
    pub fn well_bottom(&self, wc: WellCoords) -> Coordinates {
        Coordinates::new(
            self.first_well.x + wc.col as f64 * self.pitch.x,
            self.first_well.y + wc.row as f64 * self.pitch.y,
            self.first_well.z,
        )
    }

    /// Centre of the top of `wc` relative to the labware origin.
    pub fn well_top(&self, wc: WellCoords) -> Coordinates {
        let mut top = self.well_bottom(wc);
        top.z += self.well_size.z;
        top
    }

    /// The well whose body contains the relative point `p`, allowing `z` up to `tolerance`
    /// above the well top.
    pub fn locate(&self, p: Coordinates, tolerance: f64) -> Option<WellCoords> {
        let col = nearest(p.x - self.first_well.x, self.pitch.x, self.cols)?;
        let row = nearest(p.y - self.first_well.y, self.pitch.y, self.rows)?;
        let wc = WellCoords::new(row, col);

        let bottom = self.well_bottom(wc);
        let inside_xy = (p.x - bottom.x).abs() <= self.well_size.x / 2.0 + GEOMETRY_EPSILON
            && (p.y - bottom.y).abs() <= self.well_size.y / 2.0 + GEOMETRY_EPSILON;
        let inside_z = p.z >= bottom.z - GEOMETRY_EPSILON
            && p.z <= bottom.z + self.well_size.z + tolerance + GEOMETRY_EPSILON;

        (inside_xy && inside_z).then_some(wc)
    }

    pub fn iter(&self) -> impl Iterator<Item = WellCoords> + use<> {
        let (rows, cols) = (self.rows, self.cols);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| WellCoords::new(row, col)))
    }

    pub fn size_label(&self) -> String {
        format!("[{}x{}]", self.rows, self.cols)
    }
}

/// Index of the grid line nearest to `offset` along an axis with `count` lines at `pitch`.
fn nearest(offset: f64, pitch: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    if count == 1 || pitch.abs() <= GEOMETRY_EPSILON {
        return Some(0);
    }
    let index = (offset / pitch).round();
    (index >= 0.0 && index < count as f64).then_some(index as usize)
}

/// A labware instance as it sits on the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Labware {
    Plate(Plate),
    Tipbox(Tipbox),
    Tipwaste(Tipwaste),
}

impl Labware {
    pub fn kind(&self) -> LabwareKind {
        match self {
            Labware::Plate(_) => LabwareKind::Plate,
            Labware::Tipbox(_) => LabwareKind::Tipbox,
            Labware::Tipwaste(_) => LabwareKind::Tipwaste,
        }
    }

    /// The instance name, e.g. `plate1`.
    pub fn name(&self) -> &str {
        match self {
            Labware::Plate(p) => &p.name,
            Labware::Tipbox(t) => &t.name,
            Labware::Tipwaste(w) => &w.name,
        }
    }

    /// The catalog type name, e.g. `plate`.
    pub fn type_name(&self) -> &str {
        match self {
            Labware::Plate(p) => &p.type_name,
            Labware::Tipbox(t) => &t.type_name,
            Labware::Tipwaste(w) => &w.type_name,
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            Labware::Plate(p) => p.footprint,
            Labware::Tipbox(t) => t.footprint,
            Labware::Tipwaste(w) => w.footprint,
        }
    }

    pub fn grid(&self) -> &Grid {
        match self {
            Labware::Plate(p) => &p.grid,
            Labware::Tipbox(t) => &t.grid,
            Labware::Tipwaste(w) => &w.grid,
        }
    }

    pub fn as_plate(&self) -> Option<&Plate> {
        match self {
            Labware::Plate(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_plate_mut(&mut self) -> Option<&mut Plate> {
        match self {
            Labware::Plate(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_tipbox(&self) -> Option<&Tipbox> {
        match self {
            Labware::Tipbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tipbox_mut(&mut self) -> Option<&mut Tipbox> {
        match self {
            Labware::Tipbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tipwaste(&self) -> Option<&Tipwaste> {
        match self {
            Labware::Tipwaste(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_tipwaste_mut(&mut self) -> Option<&mut Tipwaste> {
        match self {
            Labware::Tipwaste(w) => Some(w),
            _ => None,
        }
    }
}

impl From<Plate> for Labware {
    fn from(p: Plate) -> Self {
        Labware::Plate(p)
    }
}

impl From<Tipbox> for Labware {
    fn from(t: Tipbox) -> Self {
        Labware::Tipbox(t)
    }
}

impl From<Tipwaste> for Labware {
    fn from(w: Tipwaste) -> Self {
        Labware::Tipwaste(w)
    }
}
