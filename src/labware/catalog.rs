use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::UnknownLabwareType;
use super::{Grid, Labware, LabwareKind, Plate, TipSpec, Tipbox, Tipwaste};
use crate::units::{Coordinates, Footprint, Volume};

/// SBS footprint shared by every standard labware type.
pub const SBS_FOOTPRINT: Footprint = Footprint::new(127.76, 85.48);

/// Static description of a labware type from which instances are created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabwareSpec {
    Plate {
        footprint: Footprint,
        grid: Grid,
        max_volume: Volume,
        residual_volume: Volume,
    },
    Tipbox {
        footprint: Footprint,
        grid: Grid,
        tip: TipSpec,
    },
    Tipwaste {
        footprint: Footprint,
        grid: Grid,
        capacity: usize,
    },
}

impl LabwareSpec {
    pub fn kind(&self) -> LabwareKind {
        match self {
            LabwareSpec::Plate { .. } => LabwareKind::Plate,
            LabwareSpec::Tipbox { .. } => LabwareKind::Tipbox,
            LabwareSpec::Tipwaste { .. } => LabwareKind::Tipwaste,
        }
    }

    fn instantiate(&self, type_name: &str, name: &str) -> Labware {
        match self {
            LabwareSpec::Plate {
                footprint,
                grid,
                max_volume,
                residual_volume,
            } => Plate::new(name, type_name, *footprint, *grid, *max_volume, *residual_volume)
                .into(),
            LabwareSpec::Tipbox {
                footprint,
                grid,
                tip,
            } => Tipbox::new(name, type_name, *footprint, *grid, tip.clone()).into(),
            LabwareSpec::Tipwaste {
                footprint,
                grid,
                capacity,
            } => Tipwaste::new(name, type_name, *footprint, *grid, *capacity).into(),
        }
    }
}

/// Labware types available by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabwareCatalog {
    specs: BTreeMap<String, LabwareSpec>,
}

impl LabwareCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with a 96 well `plate`, 1000ul and 200ul tipboxes and a `tipwaste`.
    pub fn standard() -> Self {
        let wells96 = |first_z: f64, well_size: Coordinates| Grid {
            rows: 8,
            cols: 12,
            pitch: Coordinates::new(9.0, 9.0, 0.0),
            first_well: Coordinates::new(14.38, 11.24, first_z),
            well_size,
        };

        let mut catalog = Self::new();
        catalog.register(
            "plate",
            LabwareSpec::Plate {
                footprint: SBS_FOOTPRINT,
                grid: wells96(1.0, Coordinates::new(8.2, 8.2, 11.0)),
                max_volume: Volume::ul(200.0),
                residual_volume: Volume::ul(5.0),
            },
        );
        catalog.register(
            "tipbox",
            LabwareSpec::Tipbox {
                footprint: SBS_FOOTPRINT,
                grid: wells96(0.0, Coordinates::new(7.0, 7.0, 60.0)),
                tip: TipSpec {
                    type_name: "tip1000".to_string(),
                    min_volume: Volume::ul(50.0),
                    max_volume: Volume::ul(1000.0),
                },
            },
        );
        catalog.register(
            "tipbox_200",
            LabwareSpec::Tipbox {
                footprint: SBS_FOOTPRINT,
                grid: wells96(0.0, Coordinates::new(6.0, 6.0, 50.0)),
                tip: TipSpec {
                    type_name: "tip200".to_string(),
                    min_volume: Volume::ul(10.0),
                    max_volume: Volume::ul(200.0),
                },
            },
        );
        catalog.register(
            "tipwaste",
            LabwareSpec::Tipwaste {
                footprint: SBS_FOOTPRINT,
                grid: Grid {
                    rows: 1,
                    cols: 1,
                    pitch: Coordinates::ORIGIN,
                    first_well: Coordinates::new(63.88, 42.74, 0.0),
                    well_size: Coordinates::new(120.0, 80.0, 60.0),
                },
                capacity: 700,
            },
        );
        catalog
    }

    /// Register `spec` under `type_name`, replacing any previous entry.
    pub fn register(&mut self, type_name: impl Into<String>, spec: LabwareSpec) {
        self.specs.insert(type_name.into(), spec);
    }

    pub fn get(&self, type_name: &str) -> Option<&LabwareSpec> {
        self.specs.get(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabwareSpec)> {
        self.specs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Create a fresh instance called `name` of the catalog type `type_name`.
    pub fn instantiate(&self, type_name: &str, name: &str) -> Result<Labware, UnknownLabwareType> {
        self.get(type_name)
            .map(|spec| spec.instantiate(type_name, name))
            .ok_or_else(|| UnknownLabwareType {
                type_name: type_name.to_string(),
            })
    }

    /// Merge `other` into `self`, with entries in `other` taking precedence.
    pub fn extend(&mut self, other: LabwareCatalog) {
        self.specs.extend(other.specs);
    }
}
