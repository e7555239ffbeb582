use super::AlignedRow;
use crate::document::Row;
use crate::markers::ENDPOINT_HEADER;
use crate::types::MeasurementRecord;
use crate::utils::{split_wavelength_pair, value_to_float};
use crate::well::{PlateType, Well};
use std::collections::HashMap;
use tracing::debug;

/// Column mapping and wavelengths established by one `Wavelength(Ex/Em)` row.
struct EndpointHeader {
    /// Data-row position to well column number.
    columns: HashMap<i64, u32>,
    excitation_nm: Option<f64>,
    emission_nm: Option<f64>,
}

impl EndpointHeader {
    fn new(header: &AlignedRow) -> Self {
        // Data rows carry an explicit index one past the header's positions.
        let columns = header
            .cells()
            .filter_map(|(index, text)| {
                let column = text.trim().parse::<u32>().ok()?;
                Some((index.checked_add(1)?, column))
            })
            .collect();

        let (excitation_nm, emission_nm) = header
            .texts
            .get(1)
            .map(|label| split_wavelength_pair(label))
            .unwrap_or((None, None));

        Self {
            columns,
            excitation_nm,
            emission_nm,
        }
    }
}

/// Parse endpoint rows: each data row leads with a well-row letter.
///
/// A plate may hold several wavelength blocks; each header row replaces the
/// column mapping and the wavelength pair for the rows that follow it.
pub(super) fn parse(rows: &[Row], plate_type: PlateType) -> Vec<MeasurementRecord> {
    let mut records = Vec::new();
    let mut header: Option<EndpointHeader> = None;

    for row in rows.iter().filter(|row| !row.is_empty()) {
        let aligned = AlignedRow::new(row);

        if aligned.is_header(ENDPOINT_HEADER) {
            let block = EndpointHeader::new(&aligned);
            debug!(
                "Endpoint block at {:?}/{:?} nm with {} columns",
                block.excitation_nm,
                block.emission_nm,
                block.columns.len()
            );
            header = Some(block);
            continue;
        }

        let Some(block) = header.as_ref() else {
            debug!("Skipping row before '{}' header", ENDPOINT_HEADER);
            continue;
        };

        let row_label = aligned.leading_text().unwrap_or_default().trim();
        if Well::from_row_label(row_label, 1, plate_type).is_err() {
            debug!("Skipping row with leading cell '{}'", row_label);
            continue;
        }

        for (index, text) in aligned.cells().skip(1) {
            let Some(&column) = block.columns.get(&index) else {
                continue;
            };
            match Well::from_row_label(row_label, column, plate_type) {
                Ok(well) => records.push(MeasurementRecord::spectral(
                    well,
                    value_to_float(text),
                    block.excitation_nm,
                    block.emission_nm,
                )),
                Err(e) => debug!("Skipping cell: {}", e),
            }
        }
    }

    records
}
