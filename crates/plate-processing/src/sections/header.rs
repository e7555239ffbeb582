use crate::config::ParserConfig;
use crate::error::{PlateParseError, Result};
use crate::markers::keys;
use crate::types::{MeasurementType, Metadata};
use crate::well::PlateType;
use chrono::NaiveDateTime;
use tracing::warn;

/// Fields read from a plate's metadata before its measurements are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateHeader {
    pub name: String,
    pub timestamp: Option<NaiveDateTime>,
    pub plate_type: PlateType,
    pub measurement_type: MeasurementType,
}

impl PlateHeader {
    /// Read the header fields from harvested metadata.
    ///
    /// A missing name becomes empty, a missing or unparsable read time
    /// becomes `None` and a missing well count falls back to the configured
    /// plate type.
    ///
    /// # Errors
    ///
    /// - [`PlateParseError::UnsupportedPlateSize`] if "Well count" names a
    ///   format other than 96 or 384 wells.
    /// - [`PlateParseError::UnknownMeasurementType`] if "Measurement type" is
    ///   absent or not one of the known layouts.
    pub fn from_metadata(metadata: &Metadata, config: &ParserConfig) -> Result<Self> {
        let name = metadata.get(keys::PLATE_NAME).cloned().unwrap_or_default();

        let timestamp = metadata.get(keys::READ_TIME).and_then(|read_time| {
            NaiveDateTime::parse_from_str(read_time.trim(), &config.datetime_format)
                .inspect_err(|e| {
                    warn!("Plate '{}': unparsable read time '{}': {}", name, read_time, e)
                })
                .ok()
        });

        let plate_type = match metadata.get(keys::WELL_COUNT) {
            Some(label) => PlateType::from_well_count_label(label)?,
            None => config.default_plate_type,
        };

        let found = metadata.get(keys::MEASUREMENT_TYPE);
        let measurement_type = found
            .and_then(|value| MeasurementType::from_discriminator(value))
            .ok_or_else(|| PlateParseError::UnknownMeasurementType {
                plate: name.clone(),
                found: found.cloned(),
            })?;

        Ok(Self {
            name,
            timestamp,
            plate_type,
            measurement_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metadata(entries: &[(&str, &str)]) -> Metadata {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_header() {
        let metadata = metadata(&[
            ("Plate name", "day3pla2"),
            ("Read Time", "3/14/2023 10:15:30"),
            ("Well count", "384 Wells"),
            ("Measurement type", "Kinetic"),
        ]);
        let header = PlateHeader::from_metadata(&metadata, &ParserConfig::default()).unwrap();

        assert_eq!(header.name, "day3pla2");
        assert_eq!(
            header.timestamp,
            NaiveDate::from_ymd_opt(2023, 3, 14).and_then(|d| d.and_hms_opt(10, 15, 30))
        );
        assert_eq!(header.plate_type, PlateType::Plate384);
        assert_eq!(header.measurement_type, MeasurementType::Kinetic);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let metadata = metadata(&[("Measurement type", "Endpoint")]);
        let header = PlateHeader::from_metadata(&metadata, &ParserConfig::default()).unwrap();

        assert_eq!(header.name, "");
        assert_eq!(header.timestamp, None);
        assert_eq!(header.plate_type, PlateType::Plate96);
    }

    #[test]
    fn test_unparsable_read_time_is_absent() {
        let metadata = metadata(&[
            ("Read Time", "yesterday"),
            ("Measurement type", "SpectrumScan"),
        ]);
        let header = PlateHeader::from_metadata(&metadata, &ParserConfig::default()).unwrap();
        assert_eq!(header.timestamp, None);
    }

    #[test]
    fn test_unknown_measurement_type() {
        let metadata = metadata(&[("Plate name", "P1"), ("Measurement type", "AreaScan")]);
        let err = PlateHeader::from_metadata(&metadata, &ParserConfig::default()).unwrap_err();
        match err {
            PlateParseError::UnknownMeasurementType { plate, found } => {
                assert_eq!(plate, "P1");
                assert_eq!(found.as_deref(), Some("AreaScan"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = PlateHeader::from_metadata(&Metadata::new(), &ParserConfig::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_MEASUREMENT_TYPE");
    }

    #[test]
    fn test_unsupported_plate_size() {
        let metadata = metadata(&[("Well count", "1536 Wells"), ("Measurement type", "Endpoint")]);
        let err = PlateHeader::from_metadata(&metadata, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, PlateParseError::UnsupportedPlateSize(_)));
    }
}
