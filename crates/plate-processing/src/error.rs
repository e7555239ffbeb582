//! Custom error types for plate reader parsing.
//!
//! Per-cell and per-row anomalies never surface here; they are absorbed by
//! the measurement parsers. What remains are whole-document failures
//! (no plates at all), per-plate structural failures (unknown measurement
//! type, unsupported plate size) and I/O or XML errors from loading.
//!
//! Errors are serializable so the CLI can emit them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for plate parsing.
#[derive(Error, Debug)]
pub enum PlateParseError {
    /// No "Plate name" marker was found anywhere in the document.
    #[error("Unable to parse any data from the plate reader. Check contents of XML file.")]
    NoPlatesFound,

    /// A plate declared a measurement type that has no parser.
    #[error("Unknown measurement type for plate '{plate}': {found:?}")]
    UnknownMeasurementType {
        plate: String,
        found: Option<String>,
    },

    /// The "Well count" metadata named a plate format other than 96 or 384.
    #[error("Unsupported plate size: '{0}' (expected 96 or 384 wells)")]
    UnsupportedPlateSize(String),

    /// A well could not be constructed for the given plate format.
    #[error("Invalid well: {0}")]
    InvalidWell(String),

    /// The XML document could not be read.
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PlateParseError>,
    },
}

impl PlateParseError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PlateParseError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoPlatesFound => "NO_PLATES_FOUND",
            Self::UnknownMeasurementType { .. } => "UNKNOWN_MEASUREMENT_TYPE",
            Self::UnsupportedPlateSize(_) => "UNSUPPORTED_PLATE_SIZE",
            Self::InvalidWell(_) => "INVALID_WELL",
            Self::Xml(_) => "XML_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

impl Serialize for PlateParseError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PlateParseError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for plate parsing operations.
pub type Result<T> = std::result::Result<T, PlateParseError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PlateParseError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(PlateParseError::NoPlatesFound.error_code(), "NO_PLATES_FOUND");
        assert_eq!(
            PlateParseError::UnsupportedPlateSize("1536 Wells".to_string()).error_code(),
            "UNSUPPORTED_PLATE_SIZE"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PlateParseError::UnknownMeasurementType {
            plate: "Chlamy".to_string(),
            found: Some("AreaScan".to_string()),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNKNOWN_MEASUREMENT_TYPE"));
        assert!(json.contains("AreaScan"));
    }

    #[test]
    fn test_with_context() {
        let error = PlateParseError::Xml("unexpected EOF".to_string()).with_context("Loading export.xml");
        assert!(error.to_string().contains("Loading export.xml"));
        assert_eq!(error.error_code(), "XML_ERROR");
    }
}
