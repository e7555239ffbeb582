//! Plate sections of an export.
//!
//! An export is a flat row stream holding any number of plates. This module
//! slices it into one sub-stream per plate ([`segment_plates`]), splits each
//! sub-stream into metadata and measurement rows ([`PlateSection`]) and reads
//! the fields the measurement parsers need ([`PlateHeader`]).

mod header;
mod segmenter;

pub use header::PlateHeader;
pub use segmenter::{plate_start_positions, segment_plates};

use crate::document::Row;
use crate::markers;
use crate::types::Metadata;
use tracing::debug;

/// One plate's rows, split at the "well data" marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateSection<'a> {
    pub metadata: Metadata,
    /// Rows after the marker row, in document order.
    pub measurement_rows: &'a [Row],
}

impl<'a> PlateSection<'a> {
    /// Split a plate's rows into metadata and measurement rows.
    ///
    /// Every row up to and including the "well data" marker contributes one
    /// metadata entry: the first line of its text is the key and the remaining
    /// lines, concatenated without a separator, are the value. Rows without
    /// text are ignored. A plate with no marker has no measurement rows.
    pub fn classify(rows: &'a [Row]) -> Self {
        let mut metadata = Metadata::new();
        let mut measurement_rows: &'a [Row] = &[];

        for (position, row) in rows.iter().enumerate() {
            let lines = row.lines();
            if let Some((key, rest)) = lines.split_first() {
                let value = rest.concat();
                if let Some(previous) = metadata.insert(key.to_string(), value) {
                    debug!("Metadata key '{}' repeated, dropping '{}'", key, previous);
                }
            }

            if markers::is_well_data_marker(row) {
                measurement_rows = &rows[position + 1..];
                break;
            }
        }

        Self {
            metadata,
            measurement_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Cell;

    fn plate_rows() -> Vec<Row> {
        vec![
            Row::from_texts(["Experiment"]),
            Row::from_texts(["Plate name", "Chlamy"]),
            Row::new(vec![
                Cell::new("Excitation/Emission"),
                Cell::new("485/525\n561/670"),
            ]),
            Row::default(),
            Row::from_texts(["Method", "first"]),
            Row::from_texts(["Method", "second"]),
            Row::from_texts(["Well data"]),
            Row::from_texts(["Wavelength(Ex/Em)", "750/", "1"]),
            Row::from_texts(["A", "0.05"]),
        ]
    }

    #[test]
    fn test_classify_splits_at_well_data() {
        let rows = plate_rows();
        let section = PlateSection::classify(&rows);

        assert_eq!(section.measurement_rows.len(), 2);
        assert_eq!(section.measurement_rows[1], rows[8]);
        assert_eq!(section.metadata.get("Plate name").map(String::as_str), Some("Chlamy"));
        assert_eq!(section.metadata.get("Well data").map(String::as_str), Some(""));
        assert_eq!(section.metadata.get("Experiment").map(String::as_str), Some(""));
        assert!(!section.metadata.contains_key(""));
    }

    #[test]
    fn test_multiline_values_are_concatenated() {
        let rows = plate_rows();
        let section = PlateSection::classify(&rows);
        assert_eq!(
            section.metadata.get("Excitation/Emission").map(String::as_str),
            Some("485/525561/670")
        );
    }

    #[test]
    fn test_repeated_keys_keep_last_value() {
        let rows = plate_rows();
        let section = PlateSection::classify(&rows);
        assert_eq!(section.metadata.get("Method").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_missing_marker_means_no_measurements() {
        let rows = vec![
            Row::from_texts(["Plate name", "Empty"]),
            Row::from_texts(["Measurement type", "Endpoint"]),
        ];
        let section = PlateSection::classify(&rows);
        assert!(section.measurement_rows.is_empty());
        assert_eq!(section.metadata.len(), 2);
    }
}
