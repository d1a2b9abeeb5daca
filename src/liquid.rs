use std::fmt::{self, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::units::Volume;

/// The name of a liquid type, e.g. `water`.
///
/// Names are interned behind an `Arc<str>` so that compositions can be cloned freely between
/// wells and tips.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LiquidName(Arc<str>);

impl LiquidName {
    /// Create a new [`LiquidName`] from any type that can be converted into an `Arc<str>`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LiquidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LiquidName {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for LiquidName {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

/// The ordered, deduplicated set of liquid types that have contributed volume to a well or tip.
///
/// Rendered joined by `+` in first-seen order, so dispensing `water` into `green` gives
/// `green+water`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Composition {
    parts: Vec<LiquidName>,
}

impl Composition {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(name: impl Into<LiquidName>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// Parse a `+` separated label such as `green+water`.
    pub fn parse(label: &str) -> Self {
        let mut composition = Self::empty();
        for part in label.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            composition.insert(LiquidName::from(part));
        }
        composition
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[LiquidName] {
        &self.parts
    }

    pub fn contains(&self, name: &LiquidName) -> bool {
        self.parts.contains(name)
    }

    fn insert(&mut self, name: LiquidName) {
        if !self.contains(&name) {
            self.parts.push(name);
        }
    }

    /// Set-union keeping the first-seen order of `self` followed by new names from `other`.
    pub fn union(&mut self, other: &Composition) {
        for name in &other.parts {
            self.insert(name.clone());
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// Two compositions are equal when they name the same liquids, regardless of order.
impl PartialEq for Composition {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len() && self.parts.iter().all(|p| other.contains(p))
    }
}

impl Eq for Composition {}

impl Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            part.fmt(f)?;
        }
        Ok(())
    }
}

impl From<String> for Composition {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for Composition {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Composition> for String {
    fn from(c: Composition) -> Self {
        c.label()
    }
}

/// A quantity of liquid held by a well or a tip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquid {
    pub volume: Volume,
    pub composition: Composition,
}

impl Liquid {
    pub fn new(volume: Volume, composition: impl Into<Composition>) -> Self {
        Self {
            volume,
            composition: composition.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.volume.is_zero()
    }

    /// Add `volume` of liquid with the given `composition`.
    pub fn add(&mut self, volume: Volume, composition: &Composition) {
        self.volume += volume;
        self.composition.union(composition);
    }

    /// Remove `volume`, returning what was drawn. The composition label is left as residue.
    pub fn take(&mut self, volume: Volume) -> Liquid {
        self.volume = self.volume.saturating_sub(volume);
        Liquid {
            volume,
            composition: self.composition.clone(),
        }
    }
}
