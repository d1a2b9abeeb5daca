//! Named deck slots and the labware placed on them.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use self::error::PlacementError;
use crate::labware::{Labware, LabwareKind, WellCoords};
use crate::units::{Coordinates, Footprint};

pub mod error;

/// Which class of labware a slot will take.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accepts {
    Plate,
    Tipbox,
    Tipwaste,
    Any,
}

impl Accepts {
    pub fn accepts(self, kind: LabwareKind) -> bool {
        matches!(
            (self, kind),
            (Accepts::Any, _)
                | (Accepts::Plate, LabwareKind::Plate)
                | (Accepts::Tipbox, LabwareKind::Tipbox)
                | (Accepts::Tipwaste, LabwareKind::Tipwaste)
        )
    }
}

impl Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accepts::Plate => "plate",
            Accepts::Tipbox => "tipbox",
            Accepts::Tipwaste => "tipwaste",
            Accepts::Any => "any",
        })
    }
}

/// Static description of a slot: where it is, how big, and what it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    /// Lower-left corner of the slot; placed labware shares this origin.
    pub origin: Coordinates,
    pub size: Footprint,
    pub accepts: Accepts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub spec: SlotSpec,
    pub occupant: Option<Labware>,
}

/// A well (or tip slot) found under a point on the deck.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    pub location: &'a str,
    pub labware: &'a Labware,
    pub well: WellCoords,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    slots: Vec<Slot>,
}

impl Deck {
    pub fn new(specs: impl IntoIterator<Item = SlotSpec>) -> Self {
        Self {
            slots: specs
                .into_iter()
                .map(|spec| Slot {
                    spec,
                    occupant: None,
                })
                .collect(),
        }
    }

    pub fn slot(&self, location: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.spec.name == location)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Validate placing `labware` at `location` without changing the deck.
    pub fn check_placement(&self, location: &str, labware: &Labware) -> Result<(), PlacementError> {
        let kind = labware.kind();
        let name = labware.name().to_string();

        let slot = self.slot(location).ok_or_else(|| PlacementError::UnknownSlot {
            kind,
            labware: name.clone(),
            slot: location.to_string(),
        })?;

        if !slot.spec.accepts.accepts(kind) {
            return Err(PlacementError::WrongKind {
                slot: location.to_string(),
                kind,
                labware: name,
                accepts: slot.spec.accepts,
            });
        }

        if let Some(occupant) = &slot.occupant {
            return Err(PlacementError::Occupied {
                kind,
                labware: name,
                slot: location.to_string(),
                occupant_kind: occupant.kind(),
                occupant: occupant.name().to_string(),
            });
        }

        if !slot.spec.size.fits(&labware.footprint()) {
            return Err(PlacementError::TooLarge {
                kind,
                labware: name,
                footprint: labware.footprint(),
                slot: location.to_string(),
                slot_size: slot.spec.size,
            });
        }

        Ok(())
    }

    /// Put `labware` at `location`.
    pub fn place(&mut self, location: &str, labware: Labware) -> Result<(), PlacementError> {
        self.check_placement(location, &labware)?;
        if let Some(slot) = self.slots.iter_mut().find(|s| s.spec.name == location) {
            slot.occupant = Some(labware);
        }
        Ok(())
    }

    pub fn lookup(&self, location: &str) -> Option<&Labware> {
        self.slot(location).and_then(|s| s.occupant.as_ref())
    }

    pub fn lookup_mut(&mut self, location: &str) -> Option<&mut Labware> {
        self.slots
            .iter_mut()
            .find(|s| s.spec.name == location)
            .and_then(|s| s.occupant.as_mut())
    }

    /// Absolute position of the bottom centre of `well` in the labware at `location`.
    pub fn well_bottom(&self, location: &str, well: WellCoords) -> Option<Coordinates> {
        let slot = self.slot(location)?;
        let labware = slot.occupant.as_ref()?;
        labware
            .grid()
            .contains(well)
            .then(|| slot.spec.origin + labware.grid().well_bottom(well))
    }

    /// Find the well whose body contains `point`, allowing `tolerance` mm above the well top.
    pub fn probe(&self, point: Coordinates, tolerance: f64) -> Option<Probe<'_>> {
        self.slots.iter().find_map(|slot| {
            let labware = slot.occupant.as_ref()?;
            let well = labware.grid().locate(point - slot.spec.origin, tolerance)?;
            Some(Probe {
                location: &slot.spec.name,
                labware,
                well,
            })
        })
    }
}
