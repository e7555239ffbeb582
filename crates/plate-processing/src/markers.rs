//! String markers that delimit the instrument's export layout.
//!
//! The export has no declared schema: plate boundaries, the start of well
//! data and the per-type header rows are all recognised by literal text.
//! Every such predicate lives here so format drift is fixed in one place.

use crate::document::Row;

/// First cell of the row that starts a plate.
pub const PLATE_NAME: &str = "Plate name";

/// Case-insensitive marker of the last metadata row.
pub const WELL_DATA: &str = "well data";

/// Header cell of an endpoint plate's data block.
pub const ENDPOINT_HEADER: &str = "Wavelength(Ex/Em)";

/// Header cell of a spectrum scan plate's data block.
pub const SPECTRUM_HEADER: &str = "Wavelength/Well";

/// Header cell of a kinetic plate's data block.
pub const KINETIC_HEADER: &str = "Cycle(Seconds)/Well";

/// Metadata keys read by the extractor.
pub mod keys {
    pub const PLATE_NAME: &str = "Plate name";
    pub const READ_TIME: &str = "Read Time";
    pub const WELL_COUNT: &str = "Well count";
    pub const MEASUREMENT_TYPE: &str = "Measurement type";
    pub const EXCITATION_SWEEP: &str = "Excitation sweep";
    pub const EXCITATION_START: &str = "Excitation start";
    pub const EMISSION_START: &str = "Emission start";
}

/// A row starts a plate when its first non-empty cell is exactly `"Plate name"`.
pub fn is_plate_start(row: &Row) -> bool {
    row.cells()
        .iter()
        .find(|cell| !cell.text.is_empty())
        .is_some_and(|cell| cell.text == PLATE_NAME)
}

/// A row ends the metadata block when its text mentions "well data" in any case.
pub fn is_well_data_marker(row: &Row) -> bool {
    row.text().to_lowercase().contains(WELL_DATA)
}

/// Whether any cell of the row is exactly `marker`.
pub fn has_header_cell(cell_texts: &[String], marker: &str) -> bool {
    cell_texts.iter().any(|text| text == marker)
}

/// The plate name carried by a plate-start row (its last line).
pub fn plate_name_of(row: &Row) -> String {
    row.lines().last().map(|s| s.to_string()).unwrap_or_default()
}
