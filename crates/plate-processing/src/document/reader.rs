//! Streaming SpreadsheetML reader built on quick-xml.

use super::{Cell, Row};
use crate::error::{PlateParseError, Result};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use tracing::debug;

/// Read every `Row` of a SpreadsheetML workbook in document order.
///
/// Tags are matched by local name so `ss:Row` and `Row` are equivalent.
/// Text anywhere beneath a `Cell` (inside `Data`, `Font`, ...) is collected.
pub(crate) fn read_rows(xml: &str) -> Result<Vec<Row>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rows = Vec::new();

    let mut current_row: Option<Vec<Cell>> = None;
    let mut current_cell: Option<Cell> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"Row" => current_row = Some(Vec::new()),
                b"Cell" if current_row.is_some() => {
                    current_cell = Some(Cell {
                        index: index_attribute(e),
                        text: String::new(),
                    });
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"Row" => rows.push(Row::default()),
                b"Cell" => {
                    if let Some(cells) = current_row.as_mut() {
                        cells.push(Cell {
                            index: index_attribute(e),
                            text: String::new(),
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if let Some(cell) = current_cell.as_mut() {
                    cell.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(cell) = current_cell.as_mut() {
                    cell.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Ok(Event::GeneralRef(ref r)) => {
                if let Some(cell) = current_cell.as_mut() {
                    match resolve_reference(r) {
                        Some(resolved) => cell.text.push_str(&resolved),
                        None => {
                            let name = String::from_utf8_lossy(r);
                            debug!("Unresolved entity reference '&{};' kept verbatim", name);
                            cell.text.push('&');
                            cell.text.push_str(&name);
                            cell.text.push(';');
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"Cell" => {
                    if let (Some(mut cell), Some(cells)) = (current_cell.take(), current_row.as_mut())
                    {
                        cell.text = cell.text.trim().to_string();
                        cells.push(cell);
                    }
                }
                b"Row" => {
                    if let Some(cells) = current_row.take() {
                        rows.push(Row::new(cells));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PlateParseError::Xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    debug!("Read {} rows from XML", rows.len());
    Ok(rows)
}

/// The `ss:Index` attribute of a `Cell`, if any.
fn index_attribute(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"Index")
        .map(|attr| String::from_utf8_lossy(&attr.value).trim().to_string())
}

/// Resolve a numeric character reference or one of the predefined XML
/// entities. Malformed or unknown references yield `None`.
fn resolve_reference(r: &BytesRef) -> Option<String> {
    if let Ok(Some(c)) = r.resolve_char_ref() {
        return Some(c.to_string());
    }
    let name = r.decode().ok()?;
    resolve_predefined_entity(&name).map(str::to_string)
}
