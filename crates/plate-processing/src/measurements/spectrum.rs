use super::parse_well_id_grid;
use crate::document::Row;
use crate::markers::{SPECTRUM_HEADER, keys};
use crate::types::{MeasurementRecord, Metadata};
use crate::utils::value_to_float;
use crate::well::{PlateType, Well};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which wavelength a spectrum scan varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepAxis {
    Excitation,
    Emission,
}

/// Sweep direction and the wavelength held fixed during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSweep {
    pub axis: SweepAxis,
    /// Wavelength of the axis that does not vary.
    pub constant_nm: Option<f64>,
}

impl SpectrumSweep {
    /// Read the sweep from metadata.
    ///
    /// `"Excitation sweep" = "True"` means excitation varies and emission is
    /// held at "Emission start"; anything else means emission varies and
    /// excitation is held at "Excitation start".
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let is_excitation_sweep = metadata
            .get(keys::EXCITATION_SWEEP)
            .is_some_and(|flag| flag.trim() == "True");

        let (axis, constant_key) = if is_excitation_sweep {
            (SweepAxis::Excitation, keys::EMISSION_START)
        } else {
            (SweepAxis::Emission, keys::EXCITATION_START)
        };

        let constant_nm = metadata.get(constant_key).and_then(|v| value_to_float(v));
        if constant_nm.is_none() {
            warn!("Spectrum scan has no usable '{}'", constant_key);
        }

        Self { axis, constant_nm }
    }

    fn record(&self, well: Well, value: Option<f64>, swept_nm: f64) -> MeasurementRecord {
        match self.axis {
            SweepAxis::Excitation => {
                MeasurementRecord::spectral(well, value, Some(swept_nm), self.constant_nm)
            }
            SweepAxis::Emission => {
                MeasurementRecord::spectral(well, value, self.constant_nm, Some(swept_nm))
            }
        }
    }
}

/// Parse spectrum scan rows: each data row leads with the swept wavelength.
pub(super) fn parse(
    rows: &[Row],
    sweep: SpectrumSweep,
    plate_type: PlateType,
) -> Vec<MeasurementRecord> {
    let mut records = Vec::new();
    parse_well_id_grid(rows, SPECTRUM_HEADER, plate_type, |well, value, swept_nm| {
        records.push(sweep.record(well, value, swept_nm));
    });
    records
}
