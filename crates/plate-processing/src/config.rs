//! Configuration types for plate extraction.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults reproduce the instrument's documented conventions.

use crate::well::PlateType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default `Read Time` layout written by the instrument.
pub const DEFAULT_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// File format for per-plate tables written by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Configuration for the plate parser.
///
/// Use [`ParserConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust
/// use plate_processing::config::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .drop_empty_axis_columns(false)
///     .build()
///     .unwrap();
/// assert!(config.drop_missing_values);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// `chrono` format string for the "Read Time" metadata field.
    /// Default: `%m/%d/%Y %H:%M:%S`
    pub datetime_format: String,

    /// Plate format assumed when "Well count" is absent.
    /// Default: 96-well
    pub default_plate_type: PlateType,

    /// Whether to drop records whose value is missing.
    /// Default: true
    pub drop_missing_values: bool,

    /// Whether to drop axis columns that are missing for every record.
    /// Default: true
    pub drop_empty_axis_columns: bool,

    /// Whether an unrecognised measurement type fails the whole parse.
    /// When false the plate is skipped with a warning.
    /// Default: true
    pub fail_on_unknown_measurement_type: bool,

    /// Output directory for per-plate tables (CLI only).
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Format of per-plate tables (CLI only).
    /// Default: Csv
    pub output_format: OutputFormat,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            default_plate_type: PlateType::default(),
            drop_missing_values: true,
            drop_empty_axis_columns: true,
            fail_on_unknown_measurement_type: true,
            output_dir: PathBuf::from("outputs"),
            output_format: OutputFormat::default(),
        }
    }
}

impl ParserConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.datetime_format.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatetimeFormat);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Datetime format must not be empty")]
    EmptyDatetimeFormat,
}

/// Builder for [`ParserConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ParserConfigBuilder {
    datetime_format: Option<String>,
    default_plate_type: Option<PlateType>,
    drop_missing_values: Option<bool>,
    drop_empty_axis_columns: Option<bool>,
    fail_on_unknown_measurement_type: Option<bool>,
    output_dir: Option<PathBuf>,
    output_format: Option<OutputFormat>,
}

impl ParserConfigBuilder {
    /// Set the `chrono` format used for the "Read Time" field.
    pub fn datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    /// Set the plate format assumed when "Well count" is absent.
    pub fn default_plate_type(mut self, plate_type: PlateType) -> Self {
        self.default_plate_type = Some(plate_type);
        self
    }

    /// Enable or disable dropping records with a missing value.
    pub fn drop_missing_values(mut self, drop: bool) -> Self {
        self.drop_missing_values = Some(drop);
        self
    }

    /// Enable or disable dropping axis columns that are entirely missing.
    pub fn drop_empty_axis_columns(mut self, drop: bool) -> Self {
        self.drop_empty_axis_columns = Some(drop);
        self
    }

    /// Choose whether an unknown measurement type fails the parse or skips the plate.
    pub fn fail_on_unknown_measurement_type(mut self, fail: bool) -> Self {
        self.fail_on_unknown_measurement_type = Some(fail);
        self
    }

    /// Set the output directory for per-plate tables.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the per-plate table format.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ParserConfig` or an error if validation fails.
    pub fn build(self) -> Result<ParserConfig, ConfigValidationError> {
        let config = ParserConfig {
            datetime_format: self
                .datetime_format
                .unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string()),
            default_plate_type: self.default_plate_type.unwrap_or_default(),
            drop_missing_values: self.drop_missing_values.unwrap_or(true),
            drop_empty_axis_columns: self.drop_empty_axis_columns.unwrap_or(true),
            fail_on_unknown_measurement_type: self.fail_on_unknown_measurement_type.unwrap_or(true),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("outputs")),
            output_format: self.output_format.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
