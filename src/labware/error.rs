use super::WellCoords;

/// Indicates that a well address could not be read in any of the supported notations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Couldn't parse well \"{well}\"")]
pub struct WellParseError {
    pub well: String,
}

/// Indicates that a labware type name is not present in the catalog.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown labware type \"{type_name}\"")]
pub struct UnknownLabwareType {
    pub type_name: String,
}

/// Indicates that preloading a well with liquid failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FillError {
    #[error("well {well} is outside plate \"{plate}\" of size [{rows}x{cols}]")]
    OutOfRange {
        plate: String,
        well: WellCoords,
        rows: usize,
        cols: usize,
    },

    #[error("cannot fill well {well} of plate \"{plate}\" to {requested}, maximum volume is {max}")]
    Overfull {
        plate: String,
        well: WellCoords,
        requested: crate::units::Volume,
        max: crate::units::Volume,
    },
}
