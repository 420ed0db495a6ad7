//! Shared test utilities: in-memory XLSX fixture building and output
//! inspection.
//!
//! Fixtures are minimal but complete packages ([Content_Types].xml, rels,
//! workbook, styles, sheets). Inspection re-reads output archives with small
//! quick-xml helpers rather than reaching into crate internals.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

// ============================================================================
// Fixture building
// ============================================================================

/// Create an XLSX package with the given styles part and named sheets.
pub fn build_workbook(styles_xml: &str, sheets: &[(&str, String)]) -> Vec<u8> {
    build_workbook_with_extras(styles_xml, sheets, &[])
}

/// Like [`build_workbook`], with extra verbatim entries appended.
pub fn build_workbook_with_extras(
    styles_xml: &str,
    sheets: &[(&str, String)],
    extras: &[(&str, &str)],
) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        let options = FileOptions::default();

        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );
        for i in 1..=sheets.len() {
            content_types.push_str(&format!(
                "\n<Override PartName=\"/xl/worksheets/sheet{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
            ));
        }
        content_types.push_str("\n</Types>");
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#).unwrap();

        let mut workbook_rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=sheets.len() {
            workbook_rels.push_str(&format!(
                "\n<Relationship Id=\"rId{i}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{i}.xml\"/>"
            ));
        }
        workbook_rels.push_str(&format!(
            "\n<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
            sheets.len() + 1
        ));
        workbook_rels.push_str("\n</Relationships>");
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(workbook_rels.as_bytes()).unwrap();

        let mut workbook_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>"#,
        );
        for (i, (name, _)) in sheets.iter().enumerate() {
            workbook_xml.push_str(&format!(
                "<sheet name=\"{name}\" sheetId=\"{id}\" r:id=\"rId{id}\"/>",
                id = i + 1
            ));
        }
        workbook_xml.push_str("</sheets>\n</workbook>");
        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook_xml.as_bytes()).unwrap();

        zip.start_file("xl/styles.xml", options).unwrap();
        zip.write_all(styles_xml.as_bytes()).unwrap();

        for (i, (_, sheet_xml)) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();
        }

        for (name, data) in extras {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
    buf.into_inner()
}

/// Minimal styles.xml with the given cellXfs entries.
pub fn styles_xml(xf_entries: &str, count: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="{count}">{xf_entries}</cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
    )
}

/// Styles with a single default xf (index 0, locked by Excel default).
pub fn default_styles_xml() -> String {
    styles_xml(
        r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
        1,
    )
}

/// A rows×cols grid sheet with numeric cells and an optional formula cell
/// (1-based coordinates). Optionally wrapped around an existing
/// sheetProtection element.
pub fn grid_sheet_xml(
    rows: u32,
    cols: u32,
    formula_at: Option<(u32, u32)>,
    protection_element: &str,
) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>"#,
    );
    for row in 1..=rows {
        out.push_str(&format!("\n<row r=\"{row}\">"));
        for col in 1..=cols {
            let cell_ref = format!("{}{row}", col_letters(col));
            if formula_at == Some((row, col)) {
                out.push_str(&format!("<c r=\"{cell_ref}\"><f>SUM(A1:B2)</f><v>3</v></c>"));
            } else {
                out.push_str(&format!("<c r=\"{cell_ref}\"><v>{col}</v></c>"));
            }
        }
        out.push_str("</row>");
    }
    out.push_str("\n</sheetData>\n");
    out.push_str(protection_element);
    out.push_str("</worksheet>");
    out
}

/// The spec scenario workbook: two sheets, each a 5x5 grid with a formula
/// cell at C3, default styles.
pub fn two_sheet_grid() -> Vec<u8> {
    let sheet = grid_sheet_xml(5, 5, Some((3, 3)), "");
    build_workbook(
        &default_styles_xml(),
        &[("Sheet1", sheet.clone()), ("Sheet2", sheet)],
    )
}

/// 1-based column index to letters (1 -> "A").
pub fn col_letters(col: u32) -> String {
    let mut out = String::new();
    let mut n = col;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.insert(0, char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    out
}

// ============================================================================
// Output inspection
// ============================================================================

/// Read one archive entry fully.
pub fn read_entry(xlsx: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

/// All entry names in archive (index) order. `file_names()` iterates a name
/// map in unspecified order, so names are read per index instead.
pub fn entry_names(xlsx: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index_raw(i).unwrap().name().to_string())
        .collect()
}

/// Locked flag of every cellXfs entry, by index.
pub fn xf_locked_flags(xlsx: &[u8]) -> Vec<bool> {
    let styles = read_entry(xlsx, "xl/styles.xml");
    let mut xml = quick_xml::Reader::from_reader(styles.as_slice());
    let mut flags = Vec::new();
    let mut in_cell_xfs = false;
    let mut open_xf = false;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf).unwrap() {
            quick_xml::events::Event::Start(ref e) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    flags.push(true); // Excel default; protection child may flip it
                    open_xf = true;
                }
                _ => {}
            },
            quick_xml::events::Event::Empty(ref e) => match e.local_name().as_ref() {
                b"xf" if in_cell_xfs => flags.push(true),
                b"protection" if open_xf => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"locked" {
                            let locked = attr.value.as_ref() != b"0";
                            if let Some(last) = flags.last_mut() {
                                *last = locked;
                            }
                        }
                    }
                }
                _ => {}
            },
            quick_xml::events::Event::End(ref e) => match e.local_name().as_ref() {
                b"xf" => open_xf = false,
                b"cellXfs" => break,
                _ => {}
            },
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    flags
}

/// Style index of every cell in a sheet, keyed by A1 reference.
pub fn cell_styles(xlsx: &[u8], sheet_path: &str) -> HashMap<String, usize> {
    let sheet = read_entry(xlsx, sheet_path);
    let mut xml = quick_xml::Reader::from_reader(sheet.as_slice());
    let mut styles = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf).unwrap() {
            quick_xml::events::Event::Start(ref e) | quick_xml::events::Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"c" {
                    let mut cell_ref = String::new();
                    let mut style = 0usize;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => {
                                cell_ref =
                                    String::from_utf8(attr.value.to_vec()).unwrap();
                            }
                            b"s" => {
                                style = std::str::from_utf8(&attr.value)
                                    .unwrap()
                                    .parse()
                                    .unwrap();
                            }
                            _ => {}
                        }
                    }
                    if !cell_ref.is_empty() {
                        styles.insert(cell_ref, style);
                    }
                }
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    styles
}

/// Locked state of every cell in a sheet, keyed by A1 reference.
pub fn locked_map(xlsx: &[u8], sheet_path: &str) -> HashMap<String, bool> {
    let flags = xf_locked_flags(xlsx);
    cell_styles(xlsx, sheet_path)
        .into_iter()
        .map(|(cell_ref, style)| (cell_ref, flags[style]))
        .collect()
}

/// Attributes of the sheetProtection element, if present.
pub fn sheet_protection(xlsx: &[u8], sheet_path: &str) -> Option<HashMap<String, String>> {
    let sheet = read_entry(xlsx, sheet_path);
    let mut xml = quick_xml::Reader::from_reader(sheet.as_slice());
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf).unwrap() {
            quick_xml::events::Event::Start(ref e) | quick_xml::events::Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"sheetProtection" {
                    let mut attrs = HashMap::new();
                    for attr in e.attributes().flatten() {
                        attrs.insert(
                            String::from_utf8(attr.key.as_ref().to_vec()).unwrap(),
                            String::from_utf8(attr.value.to_vec()).unwrap(),
                        );
                    }
                    return Some(attrs);
                }
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    None
}

/// Every A1 reference of a rows×cols grid (1-based).
pub fn grid_refs(rows: u32, cols: u32) -> Vec<String> {
    let mut refs = Vec::new();
    for row in 1..=rows {
        for col in 1..=cols {
            refs.push(format!("{}{row}", col_letters(col)));
        }
    }
    refs
}
