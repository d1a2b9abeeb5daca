use serde::{Deserialize, Serialize};

use super::{Grid, WellCoords};
use crate::liquid::Liquid;
use crate::units::{Footprint, Volume};

/// The rated capacity of every tip in a tipbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipSpec {
    pub type_name: String,
    pub min_volume: Volume,
    pub max_volume: Volume,
}

/// A disposable pipette tip and whatever liquid it currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub spec: TipSpec,
    #[serde(default)]
    pub contents: Liquid,
}

impl Tip {
    pub fn new(spec: TipSpec) -> Self {
        Self {
            spec,
            contents: Liquid::default(),
        }
    }

    pub fn volume(&self) -> Volume {
        self.contents.volume
    }

    pub fn max_volume(&self) -> Volume {
        self.spec.max_volume
    }

    pub fn min_volume(&self) -> Volume {
        self.spec.min_volume
    }
}

/// A rack of tips laid out on a grid; empty slots are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tipbox {
    pub name: String,
    pub type_name: String,
    pub footprint: Footprint,
    pub grid: Grid,
    pub tip: TipSpec,
    tips: Vec<Option<Tip>>,
}

impl Tipbox {
    /// Create a full tipbox.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        footprint: Footprint,
        grid: Grid,
        tip: TipSpec,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            footprint,
            tips: vec![Some(Tip::new(tip.clone())); grid.len()],
            grid,
            tip,
        }
    }

    pub fn has_tip(&self, wc: WellCoords) -> bool {
        self.tip_at(wc).is_some()
    }

    pub fn tip_at(&self, wc: WellCoords) -> Option<&Tip> {
        self.grid
            .index(wc)
            .and_then(|i| self.tips.get(i))
            .and_then(Option::as_ref)
    }

    /// Remove and return the tip at `wc`.
    pub fn take_tip(&mut self, wc: WellCoords) -> Option<Tip> {
        let i = self.grid.index(wc)?;
        self.tips.get_mut(i).and_then(Option::take)
    }

    /// Return a tip into an empty slot, handing it back if the slot is occupied or missing.
    pub fn put_tip(&mut self, wc: WellCoords, tip: Tip) -> Result<(), Tip> {
        let Some(slot) = self.grid.index(wc).and_then(|i| self.tips.get_mut(i)) else {
            return Err(tip);
        };
        if slot.is_some() {
            return Err(tip);
        }
        *slot = Some(tip);
        Ok(())
    }

    pub fn tip_count(&self) -> usize {
        self.tips.iter().filter(|t| t.is_some()).count()
    }

    /// Addresses of the slots that still hold a tip, in row-major order.
    pub fn tips(&self) -> impl Iterator<Item = WellCoords> {
        self.grid
            .iter()
            .zip(self.tips.iter())
            .filter_map(|(wc, tip)| tip.as_ref().map(|_| wc))
    }

    /// Remove every tip except those at `keep`.
    pub fn clear_except(&mut self, keep: &[WellCoords]) {
        let grid = self.grid;
        for (wc, slot) in grid.iter().zip(self.tips.iter_mut()) {
            if !keep.contains(&wc) {
                *slot = None;
            }
        }
    }
}
