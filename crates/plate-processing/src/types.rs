use crate::table;
use crate::well::{PlateType, Well};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata fields harvested from a plate's leading rows.
///
/// A repeated key keeps only its last value.
pub type Metadata = BTreeMap<String, String>;

/// The measurement layouts the instrument exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementType {
    /// One value per well, at one or more fixed wavelength pairs.
    Endpoint,
    /// Values across a swept excitation or emission range.
    SpectrumScan,
    /// Values across elapsed time.
    Kinetic,
}

impl MeasurementType {
    /// Match the "Measurement type" metadata value.
    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value.trim() {
            "Endpoint" => Some(Self::Endpoint),
            "SpectrumScan" => Some(Self::SpectrumScan),
            "Kinetic" => Some(Self::Kinetic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Endpoint => "Endpoint",
            Self::SpectrumScan => "SpectrumScan",
            Self::Kinetic => "Kinetic",
        }
    }

    /// Axis columns carried by this layout's table.
    pub fn axis_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Endpoint | Self::SpectrumScan => &[table::EXCITATION_NM, table::EMISSION_NM],
            Self::Kinetic => &[table::TIME_S],
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconstructed cell: a well, its value and the axis position it was read at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub well: Well,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excitation_nm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_nm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
}

impl MeasurementRecord {
    /// Record on a wavelength axis (endpoint and spectrum scan plates).
    pub fn spectral(
        well: Well,
        value: Option<f64>,
        excitation_nm: Option<f64>,
        emission_nm: Option<f64>,
    ) -> Self {
        Self {
            well,
            value,
            excitation_nm,
            emission_nm,
            time_s: None,
        }
    }

    /// Record on the time axis (kinetic plates).
    pub fn timed(well: Well, value: Option<f64>, time_s: f64) -> Self {
        Self {
            well,
            value,
            excitation_nm: None,
            emission_nm: None,
            time_s: Some(time_s),
        }
    }
}

/// One plate's parsed data.
#[derive(Debug, Clone)]
pub struct PlateMeasurement {
    /// Plate name, empty when the export carried none.
    pub name: String,
    /// When the plate was read, if the export recorded it.
    pub timestamp: Option<NaiveDateTime>,
    pub plate_type: PlateType,
    pub measurement_type: MeasurementType,
    pub metadata: Metadata,
    /// Cleaned long-format table (see [`crate::table`] for the columns).
    pub measurements: DataFrame,
}

impl PlateMeasurement {
    /// Serializable overview of this plate.
    pub fn summary(&self) -> PlateSummary {
        let axis_values = self
            .measurement_type
            .axis_columns()
            .iter()
            .filter_map(|name| {
                table::distinct_float_values(&self.measurements, name)
                    .map(|values| (name.to_string(), values))
            })
            .collect();

        PlateSummary {
            name: self.name.clone(),
            timestamp: self.timestamp,
            plate_type: self.plate_type,
            measurement_type: self.measurement_type,
            records: self.measurements.height(),
            columns: self
                .measurements
                .get_column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            axis_values,
        }
    }
}

/// Human-readable overview of a parsed plate, for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    pub plate_type: PlateType,
    pub measurement_type: MeasurementType,
    /// Number of records in the cleaned table.
    pub records: usize,
    pub columns: Vec<String>,
    /// Distinct values of each remaining axis column, in table order.
    pub axis_values: BTreeMap<String, Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_type_discriminator() {
        assert_eq!(
            MeasurementType::from_discriminator("Endpoint"),
            Some(MeasurementType::Endpoint)
        );
        assert_eq!(
            MeasurementType::from_discriminator("SpectrumScan"),
            Some(MeasurementType::SpectrumScan)
        );
        assert_eq!(
            MeasurementType::from_discriminator("Kinetic"),
            Some(MeasurementType::Kinetic)
        );
        assert_eq!(MeasurementType::from_discriminator("kinetic"), None);
        assert_eq!(MeasurementType::from_discriminator("AreaScan"), None);
    }

    #[test]
    fn test_axis_columns() {
        assert_eq!(
            MeasurementType::Kinetic.axis_columns(),
            &["time_s"]
        );
        assert_eq!(
            MeasurementType::Endpoint.axis_columns(),
            &["excitation_nm", "emission_nm"]
        );
    }
}
