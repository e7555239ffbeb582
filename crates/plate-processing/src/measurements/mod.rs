//! Measurement-type parsers.
//!
//! Each layout has a header row, recognised by a marker cell, that maps
//! column positions to wells. Every later row starts with its axis value
//! (a well-row letter, a wavelength or a time) followed by one value per
//! column. Cells whose position is not in the header mapping are decorative
//! and skipped.

mod endpoint;
mod kinetic;
mod spectrum;

pub use spectrum::{SpectrumSweep, SweepAxis};

use crate::document::Row;
use crate::types::{MeasurementRecord, MeasurementType, Metadata};
use crate::utils::value_to_float;
use crate::well::{PlateType, Well};
use std::collections::HashMap;
use tracing::debug;

/// Parse a plate's measurement rows into records, in document order.
pub fn parse_measurements(
    measurement_type: MeasurementType,
    rows: &[Row],
    metadata: &Metadata,
    plate_type: PlateType,
) -> Vec<MeasurementRecord> {
    match measurement_type {
        MeasurementType::Endpoint => endpoint::parse(rows, plate_type),
        MeasurementType::SpectrumScan => {
            spectrum::parse(rows, SpectrumSweep::from_metadata(metadata), plate_type)
        }
        MeasurementType::Kinetic => kinetic::parse(rows, plate_type),
    }
}

/// A row's cell texts paired with their reconciled column positions.
struct AlignedRow {
    indices: Vec<i64>,
    texts: Vec<String>,
}

impl AlignedRow {
    fn new(row: &Row) -> Self {
        Self {
            indices: row.reconciled_indices(),
            texts: row.cell_texts(),
        }
    }

    fn is_header(&self, marker: &str) -> bool {
        crate::markers::has_header_cell(&self.texts, marker)
    }

    fn leading_text(&self) -> Option<&str> {
        self.texts.first().map(String::as_str)
    }

    fn cells(&self) -> impl Iterator<Item = (i64, &str)> {
        self.indices
            .iter()
            .copied()
            .zip(self.texts.iter().map(String::as_str))
    }
}

/// Map each header position holding a well ID to that well.
fn well_id_mapping(header: &AlignedRow, plate_type: PlateType) -> HashMap<i64, Well> {
    header
        .cells()
        .filter_map(|(index, text)| Well::parse(text, plate_type).ok().map(|well| (index, well)))
        .collect()
}

/// Shared walk for layouts whose header lists well IDs and whose rows lead
/// with a numeric axis value (spectrum scans and kinetic reads).
fn parse_well_id_grid(
    rows: &[Row],
    marker: &str,
    plate_type: PlateType,
    mut emit: impl FnMut(Well, Option<f64>, f64),
) {
    let mut mapping: Option<HashMap<i64, Well>> = None;

    for row in rows.iter().filter(|row| !row.is_empty()) {
        let aligned = AlignedRow::new(row);

        if aligned.is_header(marker) {
            let wells = well_id_mapping(&aligned, plate_type);
            debug!("Header row maps {} wells", wells.len());
            mapping = Some(wells);
            continue;
        }

        let Some(wells) = mapping.as_ref() else {
            debug!("Skipping row before '{}' header", marker);
            continue;
        };

        let Some(axis_value) = aligned.leading_text().and_then(value_to_float) else {
            debug!("Skipping row with non-numeric leading cell {:?}", aligned.leading_text());
            continue;
        };

        for (index, text) in aligned.cells() {
            if let Some(&well) = wells.get(&index) {
                emit(well, value_to_float(text), axis_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Cell;

    #[test]
    fn test_well_id_mapping_skips_decorative_cells() {
        let header = AlignedRow::new(&Row::new(vec![
            Cell::new("Wavelength/Well"),
            Cell::with_index("3", "Temperature(¡C)"),
            Cell::new("A1"),
            Cell::new("B1"),
            Cell::new("Z9"),
        ]));
        let mapping = well_id_mapping(&header, PlateType::Plate96);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&4].id(), "A01");
        assert_eq!(mapping[&5].id(), "B01");
    }

    #[test]
    fn test_grid_skips_rows_without_header_or_numeric_axis() {
        let rows = vec![
            Row::from_texts(["0", "0.5"]),
            Row::from_texts(["Cycle(Seconds)/Well", "A1"]),
            Row::default(),
            Row::from_texts(["30", "0.25"]),
            Row::from_texts(["~End", "0.9"]),
        ];
        let mut seen = Vec::new();
        parse_well_id_grid(&rows, "Cycle(Seconds)/Well", PlateType::Plate96, |well, value, axis| {
            seen.push((well.id(), value, axis));
        });
        assert_eq!(seen, vec![("A01".to_string(), Some(0.25), 30.0)]);
    }

    #[test]
    fn test_dispatch_by_measurement_type() {
        let rows = vec![
            Row::from_texts(["Cycle(Seconds)/Well", "A1", "A2"]),
            Row::from_texts(["0", "0.1", "0.2"]),
        ];
        let records = parse_measurements(
            MeasurementType::Kinetic,
            &rows,
            &Metadata::new(),
            PlateType::Plate96,
        );
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.time_s == Some(0.0)));

        let records = parse_measurements(
            MeasurementType::Endpoint,
            &rows,
            &Metadata::new(),
            PlateType::Plate96,
        );
        assert!(records.is_empty());
    }
}
