use std::path::PathBuf;

use crate::labware::LabwareKind;
use crate::labware::error::{FillError, UnknownLabwareType, WellParseError};
use crate::properties::error::PropertiesError;

/// Indicates why a protocol file could not be turned into a runnable protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to read protocol file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed protocol file")]
    Parse(#[from] serde_json::Error),

    #[error("labware \"{name}\" could not be created")]
    Labware {
        name: String,
        #[source]
        source: UnknownLabwareType,
    },

    #[error("labware \"{name}\" is a {kind} and cannot be filled")]
    NotAPlate { name: String, kind: LabwareKind },

    #[error("invalid fill address for plate \"{name}\"")]
    FillAddress {
        name: String,
        #[source]
        source: WellParseError,
    },

    #[error(transparent)]
    Fill(#[from] FillError),

    #[error("invalid device properties")]
    Properties(#[from] PropertiesError),
}
