//! Pipetting heads and their channels.

use serde::{Deserialize, Serialize};

use crate::labware::Tip;
use crate::units::Coordinates;

/// Fixed properties of a head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadSpec {
    pub channels: usize,
    /// Whether channels can move and act individually.
    pub independent: bool,
    /// Offset between neighbouring channels.
    #[serde(default = "default_channel_pitch")]
    pub channel_pitch: Coordinates,
}

fn default_channel_pitch() -> Coordinates {
    Coordinates::new(0.0, 9.0, 0.0)
}

impl HeadSpec {
    pub fn new(channels: usize, independent: bool) -> Self {
        Self {
            channels,
            independent,
            channel_pitch: default_channel_pitch(),
        }
    }
}

/// One pipetting position. The position is where the end of a loaded tip would be.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub position: Option<Coordinates>,
    pub tip: Option<Tip>,
}

impl Channel {
    pub fn has_tip(&self) -> bool {
        self.tip.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub spec: HeadSpec,
    channels: Vec<Channel>,
}

impl Head {
    pub fn new(spec: HeadSpec) -> Self {
        Self {
            channels: vec![Channel::default(); spec.channels],
            spec,
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn is_independent(&self) -> bool {
        self.spec.independent
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Indices of channels currently holding a tip.
    pub fn tipped(&self) -> Vec<usize> {
        self.channels
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.has_tip().then_some(i))
            .collect()
    }

    /// Position channel `index` would have if channel 0 sat at `origin`.
    pub fn offset_from_origin(&self, origin: Coordinates, index: usize) -> Coordinates {
        origin + self.spec.channel_pitch * index as f64
    }

    /// Head origin implied by channel `index` sitting at `position`.
    pub fn implied_origin(&self, position: Coordinates, index: usize) -> Coordinates {
        position - self.spec.channel_pitch * index as f64
    }

    /// Move every channel rigidly so that channel 0 sits at `origin`.
    pub fn move_rigid(&mut self, origin: Coordinates) {
        let positions: Vec<Coordinates> = (0..self.channels.len())
            .map(|i| self.offset_from_origin(origin, i))
            .collect();
        for (channel, position) in self.channels.iter_mut().zip(positions) {
            channel.position = Some(position);
        }
    }
}
