use super::parse_well_id_grid;
use crate::document::Row;
use crate::markers::KINETIC_HEADER;
use crate::types::MeasurementRecord;
use crate::well::PlateType;

/// Parse kinetic rows: each data row leads with the elapsed time in seconds.
pub(super) fn parse(rows: &[Row], plate_type: PlateType) -> Vec<MeasurementRecord> {
    let mut records = Vec::new();
    parse_well_id_grid(rows, KINETIC_HEADER, plate_type, |well, value, time_s| {
        records.push(MeasurementRecord::timed(well, value, time_s));
    });
    records
}
