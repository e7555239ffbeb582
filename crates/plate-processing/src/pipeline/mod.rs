//! Pipeline module.
//!
//! This module provides the plate parser and its progress reporting.

mod parser;
pub mod progress;

pub use parser::{SpectraMaxParser, SpectraMaxParserBuilder};
pub use progress::{
    ClosureProgressReporter, ParseStage, PlateProgress, ProgressReporter, ProgressUpdate,
};
