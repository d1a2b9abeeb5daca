use bon::Builder;
use serde::{Deserialize, Serialize};

/// Tolerances used by the simulator when comparing positions.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// How far above a well top a tip may be and still count as in the well (mm).
    #[builder(default = 5.0)]
    pub well_tolerance_mm: f64,

    /// Largest planar distance between a channel and a tip slot when loading or returning tips (mm).
    #[builder(default = 0.0)]
    pub alignment_tolerance_mm: f64,

    /// Largest deviation between channels of a non-independent head during a move (mm).
    #[builder(default = 0.0)]
    pub layout_tolerance_mm: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
