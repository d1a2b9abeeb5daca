use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

/// Names a simulated device after the protocol driving it, e.g. `protocols/serial_dilution.json`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<&Path> for DeviceId {
    fn from(path: &Path) -> Self {
        Self(path.display().to_string().into())
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0.to_string()
    }
}
