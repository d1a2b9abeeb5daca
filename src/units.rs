//! Physical quantities shared by the deck, labware and adaptor models.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Slack allowed when comparing volumes that went through float arithmetic.
pub const VOLUME_EPSILON: f64 = 1e-6;

/// Slack allowed when comparing positions that went through float arithmetic.
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// A liquid volume in microlitres.
///
/// Renders with a `ul` suffix and at most three decimals, e.g. `535.121ul`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    pub const ZERO: Volume = Volume(0.0);

    pub const fn ul(value: f64) -> Self {
        Self(value)
    }

    pub fn as_ul(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.abs() <= VOLUME_EPSILON
    }

    /// True below zero by more than [`VOLUME_EPSILON`].
    pub fn is_negative(self) -> bool {
        self.0 < -VOLUME_EPSILON
    }

    /// True if `self` exceeds `other` by more than [`VOLUME_EPSILON`].
    pub fn exceeds(self, other: Volume) -> bool {
        self.0 - other.0 > VOLUME_EPSILON
    }

    pub fn approx_eq(self, other: Volume) -> bool {
        (self.0 - other.0).abs() <= VOLUME_EPSILON
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(self, other: Volume) -> Volume {
        Volume((self.0 - other.0).max(0.0))
    }
}

impl Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ul", format_decimal(self.0, 3))
    }
}

impl Add for Volume {
    type Output = Volume;

    fn add(self, rhs: Volume) -> Volume {
        Volume(self.0 + rhs.0)
    }
}

impl AddAssign for Volume {
    fn add_assign(&mut self, rhs: Volume) {
        self.0 += rhs.0;
    }
}

impl Sub for Volume {
    type Output = Volume;

    fn sub(self, rhs: Volume) -> Volume {
        Volume(self.0 - rhs.0)
    }
}

impl SubAssign for Volume {
    fn sub_assign(&mut self, rhs: Volume) {
        self.0 -= rhs.0;
    }
}

/// A point or displacement in deck space, in millimetres.
///
/// `x` runs along labware columns, `y` along labware rows and `z` upwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinates {
    pub const ORIGIN: Coordinates = Coordinates::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Coordinates) -> f64 {
        let d = self - other;
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }

    /// Distance ignoring height.
    pub fn planar_distance(self, other: Coordinates) -> f64 {
        let d = self - other;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            format_decimal(self.x, 2),
            format_decimal(self.y, 2),
            format_decimal(self.z, 2)
        )
    }
}

impl Add for Coordinates {
    type Output = Coordinates;

    fn add(self, rhs: Coordinates) -> Coordinates {
        Coordinates::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coordinates {
    type Output = Coordinates;

    fn sub(self, rhs: Coordinates) -> Coordinates {
        Coordinates::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Coordinates {
    type Output = Coordinates;

    fn mul(self, rhs: f64) -> Coordinates {
        Coordinates::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// The planar extent of a deck slot or a piece of labware, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
}

impl Footprint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether `other` fits inside `self` without rotation.
    pub fn fits(&self, other: &Footprint) -> bool {
        other.x <= self.x + GEOMETRY_EPSILON && other.y <= self.y + GEOMETRY_EPSILON
    }
}

impl Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}mm x {}mm]", format_decimal(self.x, 2), format_decimal(self.y, 2))
    }
}

/// Format `value` with at most `places` decimals, dropping trailing zeros.
pub fn format_decimal(value: f64, places: usize) -> String {
    let rendered = format!("{value:.places$}");
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };

    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// A distance rounded to whole millimetres, as reported in diagnostics.
pub fn whole_mm(value: f64) -> i64 {
    value.round() as i64
}
