//! Row/cell view of a SpreadsheetML export.
//!
//! The instrument writes an MS Excel 2003 XML workbook. Only the `Row` and
//! `Cell` structure matters for extraction, so the loader flattens the
//! workbook into an ordered list of [`Row`]s, each holding its [`Cell`]s with
//! their optional sparse `ss:Index` attribute and flattened text.

mod reader;

use crate::error::{PlateParseError, Result, ResultExt};
use crate::utils::{forward_fill_indices, parse_index};
use std::path::Path;

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// Explicit `ss:Index` attribute, kept verbatim.
    pub index: Option<String>,
    /// All text beneath the cell, trimmed at both ends.
    pub text: String,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            index: None,
            text: text.into(),
        }
    }

    pub fn with_index(index: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            text: text.into(),
        }
    }

    /// Cell text with embedded line breaks removed.
    pub fn value_text(&self) -> String {
        self.text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
    }
}

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Convenience constructor for rows without explicit indices.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Cell::new).collect())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flattened row text: every cell's text joined by newlines.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Non-blank lines of the flattened text, trimmed.
    pub fn lines(&self) -> Vec<&str> {
        self.cells
            .iter()
            .flat_map(|c| c.text.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Per-cell text with embedded line breaks removed.
    pub fn cell_texts(&self) -> Vec<String> {
        self.cells.iter().map(Cell::value_text).collect()
    }

    /// Dense column positions for this row's cells.
    ///
    /// The row starts at its first cell's explicit index (or 0) and gaps are
    /// forward-filled from there.
    pub fn reconciled_indices(&self) -> Vec<i64> {
        let indices: Vec<Option<&str>> = self.cells.iter().map(|c| c.index.as_deref()).collect();
        let start = indices
            .first()
            .copied()
            .flatten()
            .and_then(parse_index)
            .unwrap_or(0);
        forward_fill_indices(&indices, start)
    }
}

/// An ordered, immutable stream of rows loaded from one export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpreadsheetDocument {
    rows: Vec<Row>,
}

impl SpreadsheetDocument {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Parse SpreadsheetML text.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        reader::read_rows(xml).map(Self::from_rows)
    }

    /// Read and parse a SpreadsheetML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .map_err(PlateParseError::from)
            .context(format!("Reading {}", path.display()))?;
        Self::from_xml_str(&xml).context(format!("Parsing {}", path.display()))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Line-per-row rendering with cells separated by `" | "`.
    pub fn prettify(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.lines().join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
