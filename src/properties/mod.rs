//! Static description of a liquid handler: its deck slots, heads and location preferences.

use std::collections::HashSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use self::error::PropertiesError;
use crate::adaptor::HeadSpec;
use crate::deck::{Accepts, SlotSpec};
use crate::labware::catalog::SBS_FOOTPRINT;
use crate::units::Coordinates;

pub mod error;

/// The purposes a deck slot can be preferred for.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PreferenceKind {
    Tip,
    Input,
    Output,
    Tipwaste,
    Wash,
    Waste,
}

impl PreferenceKind {
    pub const ALL: [PreferenceKind; 6] = [
        PreferenceKind::Tip,
        PreferenceKind::Input,
        PreferenceKind::Output,
        PreferenceKind::Tipwaste,
        PreferenceKind::Wash,
        PreferenceKind::Waste,
    ];
}

impl Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreferenceKind::Tip => "tip",
            PreferenceKind::Input => "input",
            PreferenceKind::Output => "output",
            PreferenceKind::Tipwaste => "tipwaste",
            PreferenceKind::Wash => "wash",
            PreferenceKind::Waste => "waste",
        })
    }
}

/// Ordered lists of slot names preferred for each purpose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub tips: Vec<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub tipwaste: Vec<String>,
    pub wash: Vec<String>,
    pub waste: Vec<String>,
}

impl Preferences {
    pub fn get(&self, kind: PreferenceKind) -> &[String] {
        match kind {
            PreferenceKind::Tip => &self.tips,
            PreferenceKind::Input => &self.inputs,
            PreferenceKind::Output => &self.outputs,
            PreferenceKind::Tipwaste => &self.tipwaste,
            PreferenceKind::Wash => &self.wash,
            PreferenceKind::Waste => &self.waste,
        }
    }

    pub fn get_mut(&mut self, kind: PreferenceKind) -> &mut Vec<String> {
        match kind {
            PreferenceKind::Tip => &mut self.tips,
            PreferenceKind::Input => &mut self.inputs,
            PreferenceKind::Output => &mut self.outputs,
            PreferenceKind::Tipwaste => &mut self.tipwaste,
            PreferenceKind::Wash => &mut self.wash,
            PreferenceKind::Waste => &mut self.waste,
        }
    }
}

/// An advisory problem with the preference lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceIssue {
    Missing(PreferenceKind),
    Undefined {
        kind: PreferenceKind,
        location: String,
    },
}

impl Display for PreferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceIssue::Missing(kind) => write!(f, "No {kind} preferences specified"),
            PreferenceIssue::Undefined { kind, location } => write!(
                f,
                "Undefined location \"{location}\" referenced in {kind} preferences"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProperties {
    #[serde(default = "default_model")]
    pub model: String,
    pub slots: Vec<SlotSpec>,
    pub heads: Vec<HeadSpec>,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_model() -> String {
    "virtual".to_string()
}

impl DeviceProperties {
    /// A nine slot deck with a single non-independent eight channel head.
    pub fn standard() -> Self {
        let slot = |name: &str, x: f64, y: f64, accepts: Accepts| SlotSpec {
            name: name.to_string(),
            origin: Coordinates::new(x, y, 0.0),
            size: SBS_FOOTPRINT,
            accepts,
        };
        let names = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

        Self {
            model: default_model(),
            slots: vec![
                slot("tipbox_1", 0.0, 0.0, Accepts::Tipbox),
                slot("tipbox_2", 140.0, 0.0, Accepts::Tipbox),
                slot("tipwaste", 280.0, 0.0, Accepts::Tipwaste),
                slot("input_1", 0.0, 100.0, Accepts::Plate),
                slot("input_2", 140.0, 100.0, Accepts::Plate),
                slot("wash", 280.0, 100.0, Accepts::Plate),
                slot("output_1", 0.0, 200.0, Accepts::Plate),
                slot("output_2", 140.0, 200.0, Accepts::Plate),
                slot("waste", 280.0, 200.0, Accepts::Plate),
            ],
            heads: vec![HeadSpec::new(8, false)],
            preferences: Preferences {
                tips: names(&["tipbox_1", "tipbox_2"]),
                inputs: names(&["input_1", "input_2"]),
                outputs: names(&["output_1", "output_2"]),
                tipwaste: names(&["tipwaste"]),
                wash: names(&["wash"]),
                waste: names(&["waste"]),
            },
        }
    }

    /// Check the structure, returning advisory preference issues on success.
    pub fn validate(&self) -> Result<Vec<PreferenceIssue>, PropertiesError> {
        if self.heads.is_empty() {
            return Err(PropertiesError::NoHeads);
        }
        if let Some(head) = self.heads.iter().position(|h| h.channels == 0) {
            return Err(PropertiesError::EmptyHead { head });
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(PropertiesError::DuplicateSlot {
                    name: slot.name.clone(),
                });
            }
        }

        let mut issues = Vec::new();
        for kind in PreferenceKind::ALL {
            let prefs = self.preferences.get(kind);
            if prefs.is_empty() {
                issues.push(PreferenceIssue::Missing(kind));
            }
            issues.extend(
                prefs
                    .iter()
                    .filter(|location| !seen.contains(location.as_str()))
                    .map(|location| PreferenceIssue::Undefined {
                        kind,
                        location: location.clone(),
                    }),
            );
        }
        Ok(issues)
    }
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self::standard()
    }
}
