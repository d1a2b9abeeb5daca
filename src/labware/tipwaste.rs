use serde::{Deserialize, Serialize};

use super::{Grid, Tip};
use crate::units::Footprint;

/// A bin for used tips. Modelled as a single large well spanning the labware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tipwaste {
    pub name: String,
    pub type_name: String,
    pub footprint: Footprint,
    pub grid: Grid,
    pub capacity: usize,
    #[serde(default)]
    discarded: Vec<Tip>,
}

impl Tipwaste {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        footprint: Footprint,
        grid: Grid,
        capacity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            footprint,
            grid,
            capacity,
            discarded: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.discarded.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.count())
    }

    /// Drop a tip in the bin, handing it back if the bin is full.
    pub fn discard(&mut self, tip: Tip) -> Result<(), Tip> {
        if self.remaining() == 0 {
            return Err(tip);
        }
        self.discarded.push(tip);
        Ok(())
    }

    pub fn discarded(&self) -> &[Tip] {
        &self.discarded
    }
}
