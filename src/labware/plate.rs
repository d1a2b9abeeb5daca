use serde::{Deserialize, Serialize};

use super::error::FillError;
use super::{Grid, WellCoords};
use crate::liquid::{Composition, Liquid};
use crate::units::{Footprint, Volume};

/// A single well and the liquid it holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Well {
    pub contents: Liquid,
}

impl Well {
    pub fn volume(&self) -> Volume {
        self.contents.volume
    }

    pub fn composition(&self) -> &Composition {
        &self.contents.composition
    }
}

/// A plate: a grid of wells sharing one maximum and residual volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub name: String,
    pub type_name: String,
    pub footprint: Footprint,
    pub grid: Grid,
    pub max_volume: Volume,
    /// Volume that stays behind in a well and cannot be drawn.
    pub residual_volume: Volume,
    wells: Vec<Well>,
}

impl Plate {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        footprint: Footprint,
        grid: Grid,
        max_volume: Volume,
        residual_volume: Volume,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            footprint,
            wells: vec![Well::default(); grid.len()],
            grid,
            max_volume,
            residual_volume,
        }
    }

    pub fn well(&self, wc: WellCoords) -> Option<&Well> {
        self.grid.index(wc).and_then(|i| self.wells.get(i))
    }

    pub fn well_mut(&mut self, wc: WellCoords) -> Option<&mut Well> {
        self.grid.index(wc).and_then(|i| self.wells.get_mut(i))
    }

    /// Volume that can still be drawn from `wc`.
    pub fn working_volume(&self, wc: WellCoords) -> Option<Volume> {
        self.well(wc)
            .map(|w| w.volume().saturating_sub(self.residual_volume))
    }

    /// Add liquid to a well before the run starts.
    pub fn fill(&mut self, wc: WellCoords, liquid: &Liquid) -> Result<(), FillError> {
        let (rows, cols) = (self.grid.rows, self.grid.cols);
        let max = self.max_volume;
        let plate = self.name.clone();

        let well = self.well_mut(wc).ok_or_else(|| FillError::OutOfRange {
            plate: plate.clone(),
            well: wc,
            rows,
            cols,
        })?;

        let requested = well.volume() + liquid.volume;
        if requested.exceeds(max) {
            return Err(FillError::Overfull {
                plate,
                well: wc,
                requested,
                max,
            });
        }

        well.contents.add(liquid.volume, &liquid.composition);
        Ok(())
    }

    pub fn wells(&self) -> impl Iterator<Item = (WellCoords, &Well)> {
        self.grid.iter().zip(self.wells.iter())
    }

    /// Total volume held across all wells.
    pub fn total_volume(&self) -> Volume {
        self.wells
            .iter()
            .fold(Volume::ZERO, |acc, w| acc + w.volume())
    }
}
