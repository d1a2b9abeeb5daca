//! JSON protocol files: device setup plus the instruction stream to simulate.
//!
//! ```json
//! {
//!   "labware": [
//!     { "name": "plate1", "type": "plate", "location": "input_1",
//!       "fill": { "A1": { "volume": 150, "liquid": "water" } } }
//!   ],
//!   "instructions": [ { "type": "initialize" }, { "type": "finalize" } ]
//! }
//! ```
//!
//! `device` and `config` default to the standard device and default tolerances. Extra labware
//! types may be declared under `catalog`; they are added to the standard catalog.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::error::ProtocolError;
use crate::config::SimulatorConfig;
use crate::instruction::{AddPlateTo, Instruction};
use crate::labware::{Labware, LabwareCatalog, WellCoords};
use crate::liquid::{Composition, Liquid};
use crate::properties::DeviceProperties;
use crate::simulator::VirtualLiquidHandler;
use crate::units::Volume;

pub mod error;

/// The on-disk form of a protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolFile {
    pub device: Option<DeviceProperties>,
    pub config: Option<SimulatorConfig>,
    pub catalog: LabwareCatalog,
    pub labware: Vec<LabwareSetup>,
    pub instructions: Vec<Instruction>,
}

/// Labware to place on the deck once the device is initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareSetup {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub location: String,
    /// Initial well contents keyed by well address, plates only.
    #[serde(default)]
    pub fill: BTreeMap<String, WellFill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellFill {
    pub volume: Volume,
    #[serde(default)]
    pub liquid: Composition,
}

/// A protocol ready to run: labware placement is part of `instructions`.
#[derive(Debug, Clone)]
pub struct Protocol {
    pub properties: DeviceProperties,
    pub config: SimulatorConfig,
    pub instructions: Vec<Instruction>,
}

impl ProtocolFile {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ProtocolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Instantiate and fill the declared labware and splice its placement into the stream.
    ///
    /// Placement goes right after the first `Initialize`, or at the front when there is none.
    pub fn into_protocol(self) -> Result<Protocol, ProtocolError> {
        let mut catalog = LabwareCatalog::standard();
        catalog.extend(self.catalog);

        let mut setup = Vec::with_capacity(self.labware.len());
        for entry in self.labware {
            let labware = build_labware(&catalog, &entry)?;
            debug!(labware = %entry.name, location = %entry.location, "labware declared");
            setup.push(Instruction::AddPlateTo(AddPlateTo {
                location: entry.location,
                labware,
            }));
        }

        let mut instructions = self.instructions;
        let at = instructions
            .iter()
            .position(|i| matches!(i, Instruction::Initialize))
            .map_or(0, |i| i + 1);
        let rest = instructions.split_off(at);
        instructions.extend(setup);
        instructions.extend(rest);

        Ok(Protocol {
            properties: self.device.unwrap_or_else(DeviceProperties::standard),
            config: self.config.unwrap_or_default(),
            instructions,
        })
    }
}

fn build_labware(catalog: &LabwareCatalog, entry: &LabwareSetup) -> Result<Labware, ProtocolError> {
    let mut labware = catalog
        .instantiate(&entry.type_name, &entry.name)
        .map_err(|source| ProtocolError::Labware {
            name: entry.name.clone(),
            source,
        })?;

    if entry.fill.is_empty() {
        return Ok(labware);
    }

    let kind = labware.kind();
    let Some(plate) = labware.as_plate_mut() else {
        return Err(ProtocolError::NotAPlate {
            name: entry.name.clone(),
            kind,
        });
    };
    for (well, fill) in &entry.fill {
        let wc = WellCoords::parse(well).map_err(|source| ProtocolError::FillAddress {
            name: entry.name.clone(),
            source,
        })?;
        plate.fill(wc, &Liquid::new(fill.volume, fill.liquid.clone()))?;
    }
    Ok(labware)
}

impl Protocol {
    /// Build a fresh simulator for this protocol's device.
    pub fn simulator(&self) -> Result<VirtualLiquidHandler, ProtocolError> {
        Ok(VirtualLiquidHandler::new(
            self.properties.clone(),
            self.config.clone(),
        )?)
    }
}
