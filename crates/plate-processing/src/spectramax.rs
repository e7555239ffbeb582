//! Entry points for SpectraMax XML exports.

use crate::document::SpreadsheetDocument;
use crate::error::Result;
use crate::markers;
use crate::pipeline::SpectraMaxParser;
use crate::sections::plate_start_positions;
use crate::types::PlateMeasurement;
use std::path::Path;

/// A loaded SpectraMax export.
///
/// Offers cheap inspection (plate names, a readable dump of the rows) next
/// to the full parse.
///
/// # Example
///
/// ```rust,no_run
/// use plate_processing::SpectraMaxXmlParser;
///
/// let export = SpectraMaxXmlParser::from_path("plate_data.xml")?;
/// println!("{} plates: {:?}", export.num_plates(), export.plate_names());
///
/// for plate in export.parse()? {
///     println!("{}", plate.measurements);
/// }
/// # Ok::<(), plate_processing::PlateParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpectraMaxXmlParser {
    document: SpreadsheetDocument,
}

impl SpectraMaxXmlParser {
    pub fn from_document(document: SpreadsheetDocument) -> Self {
        Self { document }
    }

    /// Load an export from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        SpreadsheetDocument::from_path(path).map(Self::from_document)
    }

    /// Load an export from SpreadsheetML text.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        SpreadsheetDocument::from_xml_str(xml).map(Self::from_document)
    }

    pub fn document(&self) -> &SpreadsheetDocument {
        &self.document
    }

    /// Names of all plates in document order, without parsing measurements.
    pub fn plate_names(&self) -> Vec<String> {
        let rows = self.document.rows();
        plate_start_positions(rows)
            .into_iter()
            .map(|position| markers::plate_name_of(&rows[position]))
            .collect()
    }

    pub fn num_plates(&self) -> usize {
        plate_start_positions(self.document.rows()).len()
    }

    /// Line-per-row rendering of the export, cells joined by `" | "`.
    pub fn prettify(&self) -> String {
        self.document.prettify()
    }

    /// Parse every plate with the default configuration.
    pub fn parse(&self) -> Result<Vec<PlateMeasurement>> {
        self.parse_with(&SpectraMaxParser::default())
    }

    /// Parse every plate with a configured parser.
    pub fn parse_with(&self, parser: &SpectraMaxParser) -> Result<Vec<PlateMeasurement>> {
        parser.parse(&self.document)
    }
}

/// Parse a SpectraMax export file into one measurement per plate.
///
/// The instrument writes its reads to an MS Excel 2003 XML workbook. Three
/// measurement types are understood: `Endpoint` (one value per well at fixed
/// wavelengths), `SpectrumScan` (a sweep over excitation or emission
/// wavelengths) and `Kinetic` (reads over time). A single export may mix
/// several plates of different types.
pub fn parse_spectramax_xml(path: impl AsRef<Path>) -> Result<Vec<PlateMeasurement>> {
    SpectraMaxXmlParser::from_path(path)?.parse()
}
