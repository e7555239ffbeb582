//! Plate formats and well identity.

use crate::error::{PlateParseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported microplate formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum PlateType {
    /// 8 x 12 wells (rows A-H, columns 1-12)
    #[default]
    Plate96,
    /// 16 x 24 wells (rows A-P, columns 1-24)
    Plate384,
}

impl PlateType {
    /// Total number of wells on the plate.
    pub fn well_count(&self) -> u32 {
        match self {
            Self::Plate96 => 96,
            Self::Plate384 => 384,
        }
    }

    /// Last valid row letter.
    pub fn last_row(&self) -> char {
        match self {
            Self::Plate96 => 'H',
            Self::Plate384 => 'P',
        }
    }

    /// Number of columns.
    pub fn columns(&self) -> u32 {
        match self {
            Self::Plate96 => 12,
            Self::Plate384 => 24,
        }
    }

    /// Parse the instrument's "Well count" field, e.g. `"96 Wells"`.
    pub fn from_well_count_label(label: &str) -> Result<Self> {
        let count = label
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<u32>().ok())
            .ok_or_else(|| PlateParseError::UnsupportedPlateSize(label.to_string()))?;
        Self::try_from(count).map_err(|_| PlateParseError::UnsupportedPlateSize(label.to_string()))
    }
}

impl TryFrom<u32> for PlateType {
    type Error = PlateParseError;

    fn try_from(count: u32) -> Result<Self> {
        match count {
            96 => Ok(Self::Plate96),
            384 => Ok(Self::Plate384),
            other => Err(PlateParseError::UnsupportedPlateSize(other.to_string())),
        }
    }
}

impl From<PlateType> for u32 {
    fn from(plate_type: PlateType) -> Self {
        plate_type.well_count()
    }
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-well", self.well_count())
    }
}

/// A single well on a microplate.
///
/// Construction validates the row letter and column number against the
/// plate format, so a `Well` always names a position that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Well {
    row: char,
    column: u32,
    plate_type: PlateType,
}

impl Well {
    /// Create a well from a row letter and a 1-based column number.
    pub fn new(row: char, column: u32, plate_type: PlateType) -> Result<Self> {
        if !row.is_ascii_uppercase() {
            return Err(PlateParseError::InvalidWell(format!(
                "row must be a single uppercase letter (A-Z), got '{row}'"
            )));
        }
        if row > plate_type.last_row() {
            return Err(PlateParseError::InvalidWell(format!(
                "for {plate_type} plates, row must be between A and {}, got '{row}'",
                plate_type.last_row()
            )));
        }
        if !(1..=plate_type.columns()).contains(&column) {
            return Err(PlateParseError::InvalidWell(format!(
                "for {plate_type} plates, column must be between 1 and {}, got {column}",
                plate_type.columns()
            )));
        }
        Ok(Self {
            row,
            column,
            plate_type,
        })
    }

    /// Create a well from a row label (one letter) and a column number.
    pub fn from_row_label(row: &str, column: u32, plate_type: PlateType) -> Result<Self> {
        let mut chars = row.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter, column, plate_type),
            _ => Err(PlateParseError::InvalidWell(format!(
                "row must be a single uppercase letter (A-Z), got '{row}'"
            ))),
        }
    }

    /// Parse a compact well ID such as `"A1"`, `"A01"` or `"h12"`.
    pub fn parse(well_id: &str, plate_type: PlateType) -> Result<Self> {
        let well_id = well_id.trim();
        let mut chars = well_id.chars();
        let row = match chars.next() {
            Some(letter) if well_id.len() >= 2 => letter.to_ascii_uppercase(),
            _ => {
                return Err(PlateParseError::InvalidWell(format!(
                    "well ID must be at least 2 characters (e.g. 'A1' or 'A01'), got '{well_id}'"
                )));
            }
        };
        let column = chars.as_str().parse::<u32>().map_err(|_| {
            PlateParseError::InvalidWell(format!("could not parse column number from '{well_id}'"))
        })?;
        Self::new(row, column, plate_type)
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn plate_type(&self) -> PlateType {
        self.plate_type
    }

    /// Canonical ID with a zero-padded column, e.g. `A01`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.row, self.column)
    }
}
