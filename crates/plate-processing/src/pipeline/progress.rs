//! Progress reporting for the plate parser.
//!
//! Extraction walks the stages of [`ParseStage`] in order. Per-plate stages
//! emit one update per plate, carrying the plate's position and name, so a
//! CLI or GUI can show which plate is being worked on.
//!
//! # Example
//!
//! ```rust
//! use plate_processing::SpectraMaxParser;
//!
//! let parser = SpectraMaxParser::builder()
//!     .on_progress(|update| match &update.plate {
//!         Some(plate) => println!("{} {}/{}: {}", update.stage, plate.index, plate.total, plate.name),
//!         None => println!("{}: {}", update.stage, update.message),
//!     })
//!     .build()
//!     .unwrap();
//! # let _ = parser;
//! ```

use crate::error::PlateParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of a parse, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Initializing,
    /// Locating "Plate name" rows in the row stream
    Segmenting,
    /// Harvesting metadata and header fields, once per plate
    ExtractingMetadata,
    /// Reconstructing records, once per plate
    ParsingMeasurements,
    /// Dropping missing values and empty axis columns, once per plate
    PostProcessing,
    Complete,
    Failed,
}

impl ParseStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Segmenting => "Segmenting Plates",
            Self::ExtractingMetadata => "Extracting Metadata",
            Self::ParsingMeasurements => "Parsing Measurements",
            Self::PostProcessing => "Post-processing",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of overall progress covered by this stage, as `(start, end)`.
    ///
    /// Measurement parsing dominates, so it gets the widest span.
    pub fn span(&self) -> (f32, f32) {
        match self {
            Self::Initializing => (0.0, 0.02),
            Self::Segmenting => (0.02, 0.10),
            Self::ExtractingMetadata => (0.10, 0.30),
            Self::ParsingMeasurements => (0.30, 0.85),
            Self::PostProcessing => (0.85, 1.0),
            Self::Complete => (1.0, 1.0),
            Self::Failed => (0.0, 0.0),
        }
    }

    /// Whether the parse has stopped, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The plate a per-plate update refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateProgress {
    /// 1-based position among the plates of this stage.
    pub index: usize,
    pub total: usize,
    pub name: String,
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: ParseStage,
    /// Overall progress, 0.0 to 1.0.
    pub progress: f32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<PlateProgress>,
    /// Error code of the failure, for [`ParseStage::Failed`] updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ProgressUpdate {
    /// Update at `fraction` (0.0 to 1.0) of the way through `stage`.
    pub fn at(stage: ParseStage, fraction: f32, message: impl Into<String>) -> Self {
        let (start, end) = stage.span();
        Self {
            stage,
            progress: (start + (end - start) * fraction.clamp(0.0, 1.0)).clamp(0.0, 1.0),
            message: message.into(),
            plate: None,
            error_code: None,
        }
    }

    /// Update after finishing plate `index` (1-based) of `total` in `stage`.
    pub fn for_plate(
        stage: ParseStage,
        index: usize,
        total: usize,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let fraction = if total == 0 {
            1.0
        } else {
            index.min(total) as f32 / total as f32
        };
        Self {
            plate: Some(PlateProgress {
                index,
                total,
                name: name.into(),
            }),
            ..Self::at(stage, fraction, message)
        }
    }

    pub fn complete(plate_count: usize) -> Self {
        Self::at(ParseStage::Complete, 1.0, format!("Parsed {} plates", plate_count))
    }

    pub fn failed(error: &PlateParseError) -> Self {
        Self {
            error_code: Some(error.error_code().to_string()),
            ..Self::at(ParseStage::Failed, 0.0, error.to_string())
        }
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Receives progress updates during a parse.
///
/// Must be `Send + Sync` so a parser can be moved to a worker thread while
/// updates flow back to the caller.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
