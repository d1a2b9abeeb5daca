//! The closed set of low-level instructions a liquid handler accepts.
//!
//! Channel-indexed fields hold one entry per channel of the addressed head; `None` leaves that
//! channel out of the call.

use serde::{Deserialize, Serialize};

use crate::labware::Labware;
use crate::liquid::Composition;
use crate::units::{Coordinates, Volume};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    Initialize,
    AddPlateTo(AddPlateTo),
    Move(Move),
    LoadTips(LoadTips),
    UnloadTips(UnloadTips),
    Aspirate(Transfer),
    Dispense(Transfer),
    Mix(Mix),
    Finalize,
}

impl Instruction {
    /// Name used to attribute diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Initialize => "Initialize",
            Instruction::AddPlateTo(_) => "AddPlateTo",
            Instruction::Move(_) => "Move",
            Instruction::LoadTips(_) => "LoadTips",
            Instruction::UnloadTips(_) => "UnloadTips",
            Instruction::Aspirate(_) => "Aspirate",
            Instruction::Dispense(_) => "Dispense",
            Instruction::Mix(_) => "Mix",
            Instruction::Finalize => "Finalize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPlateTo {
    pub location: String,
    pub labware: Labware,
}

/// The anchor point of a well from which move offsets are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    #[default]
    Bottom,
    Top,
    /// The surface of the liquid currently in the well.
    LiquidLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub location: String,
    pub well: String,
    #[serde(default)]
    pub reference: Reference,
    #[serde(default)]
    pub offset: Coordinates,
    /// Labware type the caller expects to find; empty skips the check.
    #[serde(default)]
    pub labware_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub head: usize,
    pub targets: Vec<Option<MoveTarget>>,
}

/// A tipbox or tipwaste address used when loading or unloading a tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipLocation {
    pub location: String,
    pub well: String,
    #[serde(default)]
    pub labware_type: String,
}

/// Load tips onto `channels`; `sources[i]` feeds `channels[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTips {
    pub head: usize,
    pub multi: usize,
    pub channels: Vec<usize>,
    pub sources: Vec<TipLocation>,
}

/// Unload tips from `channels`; `destinations[i]` receives the tip of `channels[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnloadTips {
    pub head: usize,
    pub multi: usize,
    pub channels: Vec<usize>,
    pub destinations: Vec<TipLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTransfer {
    pub volume: Volume,
    #[serde(default)]
    pub liquid: Composition,
    #[serde(default)]
    pub labware_type: String,
    #[serde(default)]
    pub overstroke: bool,
    #[serde(default)]
    pub blowout: bool,
    /// Liquid level following.
    #[serde(default)]
    pub llf: bool,
}

/// Payload shared by aspirate and dispense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub head: usize,
    pub multi: usize,
    pub channels: Vec<Option<ChannelTransfer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMix {
    pub volume: Volume,
    pub cycles: u32,
    #[serde(default)]
    pub labware_type: String,
    #[serde(default)]
    pub liquid: Composition,
    #[serde(default)]
    pub blowout: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mix {
    pub head: usize,
    pub multi: usize,
    pub channels: Vec<Option<ChannelMix>>,
}

/// Iterate the populated entries of a channel-indexed field.
pub fn active<T>(channels: &[Option<T>]) -> impl Iterator<Item = (usize, &T)> {
    channels
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
}
