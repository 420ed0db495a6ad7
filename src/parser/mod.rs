//! XLSX package reader.
//!
//! Resolves the workbook layout (sheet names and ZIP paths, styles path)
//! from `xl/workbook.xml` and its relationships, and hosts the styles and
//! worksheet readers used to build the lock plan.

pub(crate) mod styles;
pub(crate) mod worksheet;

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{Result, XlprotectError};

/// One sheet from xl/workbook.xml, in workbook order.
#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub name: String,
    /// ZIP path of the worksheet part, e.g. "xl/worksheets/sheet1.xml".
    pub path: String,
}

/// Resolved part paths for one workbook package.
#[derive(Debug)]
pub(crate) struct PackageLayout {
    pub sheets: Vec<SheetEntry>,
    pub styles_path: String,
}

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels.
#[derive(Default, Debug)]
struct WorkbookRelationships {
    /// Map of rId -> full path for worksheet relationships.
    worksheets: HashMap<String, String>,
    /// Path to the styles part, if declared.
    styles: Option<String>,
}

/// Read the workbook layout: ordered sheets plus the styles path.
pub(crate) fn read_layout<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<PackageLayout> {
    let relationships = parse_workbook_relationships(archive);
    let sheets = get_sheet_entries(archive, &relationships.worksheets)?;

    if sheets.is_empty() {
        return Err(XlprotectError::FileFormat(
            "workbook contains no sheets".to_string(),
        ));
    }

    let styles_path = relationships
        .styles
        .unwrap_or_else(|| "xl/styles.xml".to_string());
    if archive.by_name(&styles_path).is_err() {
        return Err(XlprotectError::FileFormat(format!(
            "missing styles part: {styles_path}"
        )));
    }

    Ok(PackageLayout {
        sheets,
        styles_path,
    })
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels.
fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();

    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return rels; // Relationships file is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut rel_type = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Target" => {
                                target = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Type" => {
                                rel_type =
                                    std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    // Resolve target path relative to xl/
                    let full_path = if let Some(stripped) = target.strip_prefix('/') {
                        stripped.to_string()
                    } else {
                        format!("xl/{target}")
                    };

                    if rel_type.contains("worksheet") && !id.is_empty() && !target.is_empty() {
                        rels.worksheets.insert(id, full_path);
                    } else if rel_type.contains("/styles") {
                        rels.styles = Some(full_path);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// Get sheet names and paths from xl/workbook.xml.
fn get_sheet_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<Vec<SheetEntry>> {
    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| XlprotectError::FileFormat("missing xl/workbook.xml".to_string()))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets: Vec<SheetEntry> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    let mut name = String::new();
                    let mut r_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            // r:id attribute (namespace prefixed)
                            key if key.ends_with(b":id") || key == b"id" => {
                                r_id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        // Try to get path from relationships, fallback to default
                        let path = relationships.get(&r_id).cloned().unwrap_or_else(|| {
                            let idx = sheets.len() + 1;
                            format!("xl/worksheets/sheet{idx}.xml")
                        });
                        sheets.push(SheetEntry { name, path });
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}
