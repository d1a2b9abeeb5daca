use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::WellParseError;

static A1_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("valid A1 regex"));
static ONE_A_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([A-Za-z]+)$").expect("valid 1A regex"));
static XY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Xx]([0-9]+)[Yy]([0-9]+)$").expect("valid XY regex"));

/// Zero-based address of a well (or tip slot) inside a labware grid.
///
/// Accepts `A1`, `1A` and `X1Y1` notation when parsing and always renders as `A1`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellCoords {
    pub row: usize,
    pub col: usize,
}

impl WellCoords {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn parse(well: &str) -> Result<Self, WellParseError> {
        let well = well.trim();
        let err = || WellParseError {
            well: well.to_string(),
        };

        if let Some(caps) = XY_FORMAT.captures(well) {
            let col = one_based(&caps[1]).ok_or_else(err)?;
            let row = one_based(&caps[2]).ok_or_else(err)?;
            return Ok(Self { row, col });
        }

        let (letters, digits) = if let Some(caps) = A1_FORMAT.captures(well) {
            (caps.get(1), caps.get(2))
        } else if let Some(caps) = ONE_A_FORMAT.captures(well) {
            (caps.get(2), caps.get(1))
        } else {
            return Err(err());
        };

        let row = letters.and_then(|m| row_index(m.as_str())).ok_or_else(err)?;
        let col = digits.and_then(|m| one_based(m.as_str())).ok_or_else(err)?;
        Ok(Self { row, col })
    }
}

/// `1` → `0`; rejects `0` and overflow.
fn one_based(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()?.checked_sub(1)
}

/// `A` → 0, `Z` → 25, `AA` → 26.
fn row_index(letters: &str) -> Option<usize> {
    let mut index: usize = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as usize).checked_sub('A' as usize)? + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    index.checked_sub(1)
}

fn row_letters(mut row: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (row % 26) as u8) as char);
        if row < 26 {
            break;
        }
        row = row / 26 - 1;
    }
    letters.iter().rev().collect()
}

impl Display for WellCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", row_letters(self.row), self.col + 1)
    }
}

impl FromStr for WellCoords {
    type Err = WellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WellCoords {
    type Error = WellParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<WellCoords> for String {
    fn from(wc: WellCoords) -> Self {
        wc.to_string()
    }
}
