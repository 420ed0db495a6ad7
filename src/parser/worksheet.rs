//! Worksheet scanning.
//!
//! The rewrite pass needs to know which cells hold formulas *before* it sees
//! their `<c>` start tags, so formula detection is a separate read-only pass
//! over the sheet XML.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::parse_cell_ref_bytes;
use crate::error::{Result, XlprotectError};

/// Collect the (row, col) coordinates (0-indexed) of every cell whose `<c>`
/// element contains an `<f>` child.
///
/// Shared-formula members carry an empty `<f t="shared" si="..."/>` and count
/// as formula cells too. Cells without an `r` attribute are placed by
/// row/column cursors, matching how spreadsheet applications read them.
pub(crate) fn scan_formula_cells<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> Result<HashSet<(u32, u32)>> {
    let file = archive
        .by_name(sheet_path)
        .map_err(|_| XlprotectError::FileFormat(format!("missing worksheet part: {sheet_path}")))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);

    let mut formula_cells = HashSet::new();
    let mut buf = Vec::new();

    let mut row_cursor: u32 = 0;
    let mut current_row: u32 = 0;
    let mut col_cursor: u32 = 0;
    // Coordinates of the open <c> element, if its End hasn't been seen yet
    let mut open_cell: Option<(u32, u32)> = None;
    let mut has_formula = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"row" => {
                        let mut row = row_cursor;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some(r) = parse_u32_bytes(&attr.value) {
                                    row = r.saturating_sub(1);
                                }
                            }
                        }
                        current_row = row;
                        row_cursor = row + 1;
                        col_cursor = 0;
                    }
                    b"c" => {
                        let mut coords = (current_row, col_cursor);
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some((col, row)) = parse_cell_ref_bytes(&attr.value) {
                                    coords = (row, col);
                                }
                            }
                        }
                        col_cursor = coords.1 + 1;
                        if is_start {
                            open_cell = Some(coords);
                            has_formula = false;
                        }
                        // An empty <c/> cannot contain a formula
                    }
                    b"f" => {
                        if open_cell.is_some() {
                            has_formula = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"c" {
                    if let Some(coords) = open_cell.take() {
                        if has_formula {
                            formula_cells.insert(coords);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(formula_cells)
}

/// Parse an unsigned decimal from raw attribute bytes.
pub(crate) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}
