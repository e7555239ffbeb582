//! SpectraMax Plate Reader Parsing Library
//!
//! Turns the SpreadsheetML export of a SpectraMax microplate reader into one
//! long-format Polars table per plate.
//!
//! # Overview
//!
//! The export is a flat stream of spreadsheet rows with no declared schema.
//! Extraction proceeds in stages:
//!
//! - **Loading**: the XML workbook is flattened into rows of cells ([`document`])
//! - **Segmentation**: rows are sliced into one section per "Plate name" marker ([`sections`])
//! - **Metadata**: leading rows of each section become a key/value map
//! - **Measurements**: the remaining rows are reconstructed into well-indexed
//!   records by an Endpoint, SpectrumScan or Kinetic parser ([`measurements`])
//! - **Post-processing**: missing values and empty axis columns are dropped ([`cleaner`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plate_processing::parse_spectramax_xml;
//!
//! for plate in parse_spectramax_xml("export.xml")? {
//!     println!(
//!         "{} ({}, {}): {} records",
//!         plate.name,
//!         plate.measurement_type,
//!         plate.plate_type,
//!         plate.measurements.height()
//!     );
//! }
//! # Ok::<(), plate_processing::PlateParseError>(())
//! ```
//!
//! # Configuration
//!
//! Use [`ParserConfig`] to customize parsing:
//!
//! ```rust
//! use plate_processing::{ParserConfig, SpectraMaxParser, PlateType};
//!
//! let config = ParserConfig::builder()
//!     .datetime_format("%d/%m/%Y %H:%M:%S")
//!     .default_plate_type(PlateType::Plate384)
//!     .fail_on_unknown_measurement_type(false)
//!     .build()
//!     .unwrap();
//!
//! let parser = SpectraMaxParser::builder().config(config).build().unwrap();
//! # let _ = parser;
//! ```
//!
//! # Measurement tables
//!
//! Every table has `well_row`, `well_column`, `well_id` and `value` columns.
//! Endpoint and SpectrumScan tables add `excitation_nm` and `emission_nm`,
//! Kinetic tables add `time_s`. Axis columns with no value for any record are
//! removed, so an absorbance read keeps only `excitation_nm`.

pub mod cleaner;
pub mod config;
pub mod document;
pub mod error;
pub mod markers;
pub mod measurements;
pub mod pipeline;
pub mod reporting;
pub mod sections;
pub mod spectramax;
pub mod table;
pub mod types;
pub mod utils;
pub mod well;

// Re-exports for convenient access
pub use cleaner::TableCleaner;
pub use config::{ConfigValidationError, OutputFormat, ParserConfig, ParserConfigBuilder};
pub use document::{Cell, Row, SpreadsheetDocument};
pub use error::{PlateParseError, Result as PlateParseResult, ResultExt};
pub use measurements::{SpectrumSweep, SweepAxis};
pub use pipeline::{
    ClosureProgressReporter, ParseStage, PlateProgress, ProgressReporter, ProgressUpdate,
    SpectraMaxParser, SpectraMaxParserBuilder,
};
pub use reporting::{ExportReport, PlateWriter};
pub use spectramax::{SpectraMaxXmlParser, parse_spectramax_xml};
pub use types::{MeasurementRecord, MeasurementType, Metadata, PlateMeasurement, PlateSummary};
pub use well::{PlateType, Well};
