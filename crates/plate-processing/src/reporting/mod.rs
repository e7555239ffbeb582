//! Writing parsed plates to disk.
//!
//! This module saves each plate's measurement table as its own file and
//! builds the JSON report printed by the CLI.
//!
//! # Example
//!
//! ```rust,no_run
//! use plate_processing::reporting::PlateWriter;
//! use plate_processing::{OutputFormat, parse_spectramax_xml};
//!
//! let plates = parse_spectramax_xml("export.xml")?;
//! let writer = PlateWriter::new("outputs", OutputFormat::Csv);
//! for path in writer.write_tables(&plates)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), plate_processing::PlateParseError>(())
//! ```

use crate::config::{OutputFormat, ParserConfig};
use crate::error::{Result, ResultExt};
use crate::types::{PlateMeasurement, PlateSummary};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Report over one export, for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// One summary per plate, in document order
    pub plates: Vec<PlateSummary>,
    /// Tables written, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_files: Vec<String>,
}

impl ExportReport {
    pub fn new(input_file: impl Into<String>, plates: &[PlateMeasurement]) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            input_file: input_file.into(),
            plates: plates.iter().map(PlateMeasurement::summary).collect(),
            output_files: Vec::new(),
        }
    }

    pub fn with_output_files(mut self, paths: &[PathBuf]) -> Self {
        self.output_files = paths.iter().map(|p| p.display().to_string()).collect();
        self
    }
}

/// Writes one table file per plate.
#[derive(Debug, Clone)]
pub struct PlateWriter {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl Default for PlateWriter {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            format: OutputFormat::default(),
        }
    }
}

impl PlateWriter {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.output_dir.clone(), config.output_format)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every plate's table, returning the paths in plate order.
    pub fn write_tables(&self, plates: &[PlateMeasurement]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut paths = Vec::with_capacity(plates.len());
        for (i, plate) in plates.iter().enumerate() {
            let path = self
                .output_dir
                .join(output_file_name(i + 1, &plate.name, self.format));
            let mut df = plate.measurements.clone();
            let mut file = File::create(&path)?;

            match self.format {
                OutputFormat::Csv => CsvWriter::new(&mut file)
                    .include_header(true)
                    .with_separator(b',')
                    .finish(&mut df)
                    .context(format!("Writing {}", path.display()))?,
                OutputFormat::Parquet => {
                    ParquetWriter::new(&mut file)
                        .finish(&mut df)
                        .context(format!("Writing {}", path.display()))?;
                }
            }

            info!("Plate '{}' saved: {}", plate.name, path.display());
            paths.push(path);
        }
        Ok(paths)
    }

    /// Write a report as pretty JSON next to the tables.
    ///
    /// For an input stem of `"day3"` the file is `day3_plates.json`.
    pub fn write_report_to_file(&self, report: &ExportReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_plates.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

/// File name for the `index`-th plate (1-based), e.g. `01_Chlamy_OD.csv`.
pub fn output_file_name(index: usize, plate_name: &str, format: OutputFormat) -> String {
    format!(
        "{:02}_{}.{}",
        index,
        sanitize_file_stem(plate_name),
        format.extension()
    )
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
///
/// Runs of replaced characters collapse, and an empty result becomes `plate`.
pub fn sanitize_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            stem.push(c);
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "plate".to_string()
    } else {
        stem.to_string()
    }
}
