use crate::labware::LabwareKind;
use crate::units::Footprint;

use super::Accepts;

/// Indicates why labware could not be placed on a deck slot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlacementError {
    #[error("Cannot put {kind} \"{labware}\" at unknown slot \"{slot}\"")]
    UnknownSlot {
        kind: LabwareKind,
        labware: String,
        slot: String,
    },

    #[error("Slot \"{slot}\" can't accept {kind} \"{labware}\", only {accepts} allowed")]
    WrongKind {
        slot: String,
        kind: LabwareKind,
        labware: String,
        accepts: Accepts,
    },

    #[error(
        "Couldn't add {kind} \"{labware}\" to location \"{slot}\" which already contains {occupant_kind} \"{occupant}\""
    )]
    Occupied {
        kind: LabwareKind,
        labware: String,
        slot: String,
        occupant_kind: LabwareKind,
        occupant: String,
    },

    #[error("Footprint of {kind} \"{labware}\"{footprint} doesn't fit slot \"{slot}\"{slot_size}")]
    TooLarge {
        kind: LabwareKind,
        labware: String,
        footprint: Footprint,
        slot: String,
        slot_size: Footprint,
    },
}
