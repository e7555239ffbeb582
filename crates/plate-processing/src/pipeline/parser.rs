//! The plate parser.
//!
//! This module provides the [`SpectraMaxParser`] struct and builder for
//! driving segmentation, metadata extraction, measurement parsing and
//! post-processing over a loaded export.

use crate::cleaner::TableCleaner;
use crate::config::{ConfigValidationError, ParserConfig};
use crate::document::{Row, SpreadsheetDocument};
use crate::error::{PlateParseError, Result, ResultExt};
use crate::markers::keys;
use crate::measurements::parse_measurements;
use crate::pipeline::progress::{
    ClosureProgressReporter, ParseStage, ProgressReporter, ProgressUpdate,
};
use crate::sections::{PlateHeader, PlateSection, segment_plates};
use crate::table::records_to_dataframe;
use crate::types::PlateMeasurement;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Parser turning an export into one [`PlateMeasurement`] per plate.
///
/// Use [`SpectraMaxParser::builder()`] to create a parser with custom
/// configuration.
///
/// # Example
///
/// ```rust,no_run
/// use plate_processing::{ParserConfig, SpectraMaxParser};
///
/// let parser = SpectraMaxParser::builder()
///     .config(ParserConfig::builder().drop_empty_axis_columns(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// for plate in parser.parse_path("export.xml")? {
///     println!("{}: {} records", plate.name, plate.measurements.height());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SpectraMaxParser {
    config: ParserConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: TableCleaner,
}

static_assertions::assert_impl_all!(SpectraMaxParser: Send, Sync);

impl Default for SpectraMaxParser {
    fn default() -> Self {
        Self {
            config: ParserConfig::default(),
            progress_reporter: None,
            cleaner: TableCleaner::default(),
        }
    }
}

impl SpectraMaxParser {
    /// Create a new parser builder.
    pub fn builder() -> SpectraMaxParserBuilder {
        SpectraMaxParserBuilder::default()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a loaded document.
    ///
    /// Plates come back in document order.
    ///
    /// # Errors
    ///
    /// - [`PlateParseError::NoPlatesFound`] if the document has no plate-start row.
    /// - [`PlateParseError::UnknownMeasurementType`] if a plate's measurement
    ///   type is not recognised (unless configured to skip such plates).
    /// - [`PlateParseError::UnsupportedPlateSize`] if a plate's well count is
    ///   neither 96 nor 384.
    pub fn parse(&self, document: &SpreadsheetDocument) -> Result<Vec<PlateMeasurement>> {
        match self.parse_internal(document.rows()) {
            Ok(plates) => {
                self.report_progress(ProgressUpdate::complete(plates.len()));
                Ok(plates)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(&e));
                error!("Parse error: {}", e);
                Err(e)
            }
        }
    }

    /// Load and parse a SpreadsheetML file.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<Vec<PlateMeasurement>> {
        let document = SpreadsheetDocument::from_path(path)?;
        self.parse(&document)
    }

    /// Parse SpreadsheetML text.
    pub fn parse_str(&self, xml: &str) -> Result<Vec<PlateMeasurement>> {
        let document = SpreadsheetDocument::from_xml_str(xml)?;
        self.parse(&document)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn parse_internal(&self, rows: &[Row]) -> Result<Vec<PlateMeasurement>> {
        let start_time = Instant::now();

        info!("Starting plate extraction over {} rows...", rows.len());
        self.report_progress(ProgressUpdate::at(
            ParseStage::Initializing,
            0.0,
            "Starting plate extraction...",
        ));

        // Step 1: Segment the row stream
        self.report_progress(ProgressUpdate::at(
            ParseStage::Segmenting,
            0.0,
            "Locating plates...",
        ));
        let segments = segment_plates(rows);
        if segments.is_empty() {
            return Err(PlateParseError::NoPlatesFound);
        }
        info!("Found {} plates", segments.len());
        self.report_progress(ProgressUpdate::at(
            ParseStage::Segmenting,
            1.0,
            format!("Found {} plates", segments.len()),
        ));

        // Step 2: Harvest metadata and header fields for every plate
        let total = segments.len();
        let mut plates: Vec<(PlateSection<'_>, PlateHeader)> = Vec::with_capacity(total);
        for (i, segment) in segments.into_iter().enumerate() {
            let section = PlateSection::classify(segment);
            let name = section
                .metadata
                .get(keys::PLATE_NAME)
                .cloned()
                .unwrap_or_default();
            match PlateHeader::from_metadata(&section.metadata, &self.config) {
                Ok(header) => {
                    debug!(
                        "Plate {} '{}': {} ({}), {} measurement rows",
                        i + 1,
                        header.name,
                        header.measurement_type,
                        header.plate_type,
                        section.measurement_rows.len()
                    );
                    plates.push((section, header));
                }
                Err(PlateParseError::UnknownMeasurementType { plate, found })
                    if !self.config.fail_on_unknown_measurement_type =>
                {
                    warn!(
                        "Skipping plate {} '{}': unknown measurement type {:?}",
                        i + 1,
                        plate,
                        found
                    );
                }
                Err(e) => return Err(e),
            }
            self.report_progress(ProgressUpdate::for_plate(
                ParseStage::ExtractingMetadata,
                i + 1,
                total,
                name,
                "Extracted plate metadata",
            ));
        }

        // Step 3: Parse measurements, then post-process each table
        let total = plates.len();
        let mut measurements = Vec::with_capacity(total);
        for (i, (section, header)) in plates.into_iter().enumerate() {
            let records = parse_measurements(
                header.measurement_type,
                section.measurement_rows,
                &section.metadata,
                header.plate_type,
            );
            self.report_progress(ProgressUpdate::for_plate(
                ParseStage::ParsingMeasurements,
                i + 1,
                total,
                header.name.as_str(),
                format!("Parsed {} records", records.len()),
            ));

            let df = records_to_dataframe(&records, header.measurement_type)
                .context(format!("Building table for plate '{}'", header.name))?;
            let (df, cleaning_actions) = self
                .cleaner
                .clean(df)
                .context(format!("Cleaning table for plate '{}'", header.name))?;
            for action in &cleaning_actions {
                debug!("Plate '{}': {}", header.name, action);
            }
            self.report_progress(ProgressUpdate::for_plate(
                ParseStage::PostProcessing,
                i + 1,
                total,
                header.name.as_str(),
                format!("Cleaned table, {} records kept", df.height()),
            ));

            info!(
                "Plate '{}' ({}): {} records",
                header.name,
                header.measurement_type,
                df.height()
            );
            measurements.push(PlateMeasurement {
                name: header.name,
                timestamp: header.timestamp,
                plate_type: header.plate_type,
                measurement_type: header.measurement_type,
                metadata: section.metadata,
                measurements: df,
            });
        }

        info!(
            "Extracted {} plates in {:.2?}",
            measurements.len(),
            start_time.elapsed()
        );
        Ok(measurements)
    }
}

/// Builder for creating a [`SpectraMaxParser`] instance.
///
/// Use [`SpectraMaxParser::builder()`] to get started.
#[derive(Default)]
pub struct SpectraMaxParserBuilder {
    config: Option<ParserConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(SpectraMaxParserBuilder: Send);

impl SpectraMaxParserBuilder {
    /// Set the parser configuration.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during parsing.
    ///
    /// Use this when you need a custom reporter implementation.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the parser.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<SpectraMaxParser, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(SpectraMaxParser {
            cleaner: TableCleaner::from_config(&config),
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeasurementType;
    use std::sync::Mutex;

    const TWO_PLATES: &str = r#"<?xml version="1.0"?>
<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
 <Worksheet ss:Name="Sheet1">
  <Table>
   <Row><Cell><Data ss:Type="String">Experiment1</Data></Cell></Row>
   <Row><Cell><Data ss:Type="String">Plate name</Data></Cell><Cell><Data ss:Type="String">OD</Data></Cell></Row>
   <Row><Cell><Data ss:Type="String">Measurement type</Data></Cell><Cell><Data ss:Type="String">Endpoint</Data></Cell></Row>
   <Row><Cell><Data ss:Type="String">Well data</Data></Cell></Row>
   <Row>
    <Cell><Data ss:Type="String">Wavelength(Ex/Em)</Data></Cell>
    <Cell><Data ss:Type="String">600/</Data></Cell>
    <Cell><Data ss:Type="Number">1</Data></Cell>
    <Cell><Data ss:Type="Number">2</Data></Cell>
   </Row>
   <Row>
    <Cell ss:Index="2"><Data ss:Type="String">A</Data></Cell>
    <Cell><Data ss:Type="Number">0.1</Data></Cell>
    <Cell><Data ss:Type="String">Error</Data></Cell>
   </Row>
   <Row/>
   <Row><Cell><Data ss:Type="String">Plate name</Data></Cell><Cell><Data ss:Type="String">Growth</Data></Cell></Row>
   <Row><Cell><Data ss:Type="String">Measurement type</Data></Cell><Cell><Data ss:Type="String">MEASUREMENT_TYPE</Data></Cell></Row>
   <Row><Cell><Data ss:Type="String">Well data</Data></Cell></Row>
   <Row>
    <Cell><Data ss:Type="String">Cycle(Seconds)/Well</Data></Cell>
    <Cell><Data ss:Type="String">A1</Data></Cell>
   </Row>
   <Row>
    <Cell><Data ss:Type="Number">0</Data></Cell>
    <Cell><Data ss:Type="Number">0.5</Data></Cell>
   </Row>
  </Table>
 </Worksheet>
</Workbook>"#;

    fn two_plates(second_type: &str) -> String {
        TWO_PLATES.replace("MEASUREMENT_TYPE", second_type)
    }

    #[test]
    fn test_parser_builder_default() {
        let parser = SpectraMaxParser::builder().build().unwrap();
        assert!(parser.progress_reporter.is_none());
        assert!(parser.config().fail_on_unknown_measurement_type);
    }

    #[test]
    fn test_parse_in_document_order() {
        let plates = SpectraMaxParser::default()
            .parse_str(&two_plates("Kinetic"))
            .unwrap();

        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0].name, "OD");
        assert_eq!(plates[0].measurement_type, MeasurementType::Endpoint);
        assert_eq!(plates[0].measurements.height(), 1);
        assert_eq!(
            plates[0].measurements.get_column_names(),
            vec!["well_row", "well_column", "well_id", "value", "excitation_nm"]
        );
        assert_eq!(plates[1].name, "Growth");
        assert_eq!(plates[1].measurement_type, MeasurementType::Kinetic);
        assert_eq!(plates[1].measurements.height(), 1);
    }

    #[test]
    fn test_unknown_measurement_type_fails_whole_parse() {
        let result = SpectraMaxParser::default().parse_str(&two_plates("FluorescencePolarization"));
        assert!(matches!(
            result,
            Err(PlateParseError::UnknownMeasurementType { ref plate, .. }) if plate == "Growth"
        ));
    }

    #[test]
    fn test_unknown_measurement_type_can_be_skipped() {
        let config = ParserConfig::builder()
            .fail_on_unknown_measurement_type(false)
            .build()
            .unwrap();
        let parser = SpectraMaxParser::builder().config(config).build().unwrap();

        let plates = parser.parse_str(&two_plates("FluorescencePolarization")).unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].name, "OD");
    }

    fn single_plate(well_count: &str, measurement_rows: &str) -> String {
        format!(
            r#"<Workbook xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet"><Table>
<Row><Cell><Data>Plate name</Data></Cell><Cell><Data>Growth</Data></Cell></Row>
<Row><Cell><Data>Measurement type</Data></Cell><Cell><Data>Kinetic</Data></Cell></Row>
<Row><Cell><Data>Well count</Data></Cell><Cell><Data>{well_count}</Data></Cell></Row>
<Row><Cell><Data>Well data</Data></Cell></Row>
{measurement_rows}
</Table></Workbook>"#
        )
    }

    #[test]
    fn test_unsupported_plate_size_is_never_skipped() {
        let config = ParserConfig::builder()
            .fail_on_unknown_measurement_type(false)
            .build()
            .unwrap();
        let parser = SpectraMaxParser::builder().config(config).build().unwrap();

        let result = parser.parse_str(&single_plate("1536 Wells", ""));
        assert!(matches!(
            result,
            Err(PlateParseError::UnsupportedPlateSize(ref label)) if label == "1536 Wells"
        ));
    }

    #[test]
    fn test_huge_cell_index_degrades_to_forward_fill() {
        let rows = r#"<Row><Cell><Data>Cycle(Seconds)/Well</Data></Cell><Cell ss:Index="9223372036854775807"><Data>A1</Data></Cell><Cell><Data>A2</Data></Cell></Row>
<Row><Cell><Data>0</Data></Cell><Cell><Data>0.1</Data></Cell><Cell><Data>0.2</Data></Cell></Row>"#;
        let plates = SpectraMaxParser::default()
            .parse_str(&single_plate("96 Wells", rows))
            .unwrap();

        assert_eq!(plates.len(), 1);
        let df = &plates[0].measurements;
        assert_eq!(df.height(), 2);
        assert_eq!(crate::table::lookup_value(df, "A01", None), Some(0.1));
        assert_eq!(crate::table::lookup_value(df, "A02", None), Some(0.2));
    }

    #[test]
    fn test_no_plates_found() {
        let xml = r#"<Workbook><Table><Row><Cell><Data>Nothing</Data></Cell></Row></Table></Workbook>"#;
        let result = SpectraMaxParser::default().parse_str(xml);
        assert!(matches!(result, Err(PlateParseError::NoPlatesFound)));
    }

    #[test]
    fn test_progress_reports_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let parser = SpectraMaxParser::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();
        parser.parse_str(&two_plates("Kinetic")).unwrap();

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                ParseStage::Initializing,
                ParseStage::Segmenting,
                ParseStage::ExtractingMetadata,
                ParseStage::ParsingMeasurements,
                ParseStage::PostProcessing,
                ParseStage::ParsingMeasurements,
                ParseStage::PostProcessing,
                ParseStage::Complete,
            ]
        );
    }

    #[test]
    fn test_progress_reports_failure() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let parser = SpectraMaxParser::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();
        let _ = parser.parse_str("<Workbook/>");

        assert_eq!(stages.lock().unwrap().last(), Some(&ParseStage::Failed));
    }

    #[test]
    fn test_progress_names_each_plate() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = updates.clone();

        let parser = SpectraMaxParser::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update))
            .build()
            .unwrap();
        parser.parse_str(&two_plates("Kinetic")).unwrap();

        let updates = updates.lock().unwrap();
        let parsed: Vec<(usize, String)> = updates
            .iter()
            .filter(|u| u.stage == ParseStage::ParsingMeasurements)
            .filter_map(|u| u.plate.as_ref())
            .map(|p| (p.index, p.name.clone()))
            .collect();
        assert_eq!(parsed, vec![(1, "OD".to_string()), (2, "Growth".to_string())]);

        assert_eq!(updates.last().map(|u| u.progress), Some(1.0));
    }
}
