//! Stream-rewrites one worksheet XML.
//!
//! Two edits happen in a single pass: every `<c>` element's `s` attribute is
//! remapped to the format index carrying its target locked state, and the
//! `<sheetProtection>` element is replaced, disabled, or inserted. All other
//! events pass through untouched, so merges, charts, filters and the rest of
//! the sheet round-trip as-is.

use std::collections::HashSet;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::cell_ref::parse_cell_ref_bytes;
use crate::error::{Result, XlprotectError};
use crate::plan::StylePlan;
use crate::selection::Selection;

/// What to do with the sheet-level `<sheetProtection>` element.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ProtectionEdit<'a> {
    /// Enable protection with this legacy password hash. Any existing
    /// element (including a modern SHA-512 hash) is replaced.
    Enable { password_hash: &'a str },
    /// Disable protection, leaving any stored password hash in place.
    Disable,
    /// Disable protection and strip the stored password attributes.
    DisableAndClearPassword,
}

/// Per-sheet rewrite parameters.
pub(crate) struct SheetEdit<'a> {
    pub plan: &'a StylePlan,
    /// Rows/columns to lock; `None` locks nothing beyond formulas.
    pub selection: Option<&'a Selection>,
    /// Formula cell coordinates to lock; `None` when formula protection is off.
    pub formula_cells: Option<&'a HashSet<(u32, u32)>>,
    pub protection: ProtectionEdit<'a>,
}

impl SheetEdit<'_> {
    fn target_locked(&self, row: u32, col: u32) -> bool {
        if let Some(sel) = self.selection {
            if sel.contains_row(row) || sel.contains_col(col) {
                return true;
            }
        }
        if let Some(cells) = self.formula_cells {
            if cells.contains(&(row, col)) {
                return true;
            }
        }
        false
    }
}

/// Rewrite a worksheet part according to `edit`.
pub(crate) fn rewrite_sheet(original: &[u8], edit: &SheetEdit<'_>) -> Result<Vec<u8>> {
    let mut xml = Reader::from_reader(original);
    let mut writer = Writer::new(Vec::with_capacity(original.len()));

    let mut buf = Vec::new();
    let mut row_cursor: u32 = 0;
    let mut current_row: u32 = 0;
    let mut col_cursor: u32 = 0;
    let mut protection_emitted = false;
    // Depth inside an <sheetProtection> Start..End subtree being dropped
    let mut skipping_protection = false;

    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"sheetProtection" =>
            {
                let is_empty = matches!(event, Event::Empty(_));
                if !protection_emitted {
                    write_protection(&mut writer, e, edit.protection)?;
                    protection_emitted = true;
                }
                if !is_empty {
                    skipping_protection = true;
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"sheetProtection" => {
                skipping_protection = false;
            }
            _ if skipping_protection => {}
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"row" => {
                let mut row = row_cursor;
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r" {
                        if let Some(r) = crate::parser::worksheet::parse_u32_bytes(&attr.value) {
                            row = r.saturating_sub(1);
                        }
                    }
                }
                current_row = row;
                row_cursor = row + 1;
                col_cursor = 0;
                writer.write_event(event)?;
            }
            ref ev @ (Event::Start(ref e) | Event::Empty(ref e))
                if e.local_name().as_ref() == b"c" =>
            {
                let is_start = matches!(ev, Event::Start(_));
                let rewritten = rewrite_cell(e, edit, current_row, &mut col_cursor)?;
                if is_start {
                    writer.write_event(Event::Start(rewritten))?;
                } else {
                    writer.write_event(Event::Empty(rewritten))?;
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"sheetData" => {
                writer.write_event(Event::End(e.to_owned()))?;
                if !protection_emitted {
                    protection_emitted =
                        insert_protection_after(&mut writer, e.name().as_ref(), edit.protection)?;
                }
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"sheetData" => {
                writer.write_event(Event::Empty(e.to_owned()))?;
                if !protection_emitted {
                    protection_emitted =
                        insert_protection_after(&mut writer, e.name().as_ref(), edit.protection)?;
                }
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Remap the `s` attribute of a `<c>` element, advancing the column cursor.
fn rewrite_cell(
    e: &BytesStart<'_>,
    edit: &SheetEdit<'_>,
    current_row: u32,
    col_cursor: &mut u32,
) -> Result<BytesStart<'static>> {
    let mut coords = (current_row, *col_cursor);
    let mut style_idx: usize = 0;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some((col, row)) = parse_cell_ref_bytes(&attr.value) {
                    coords = (row, col);
                }
            }
            b"s" => {
                style_idx = std::str::from_utf8(&attr.value)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }
    *col_cursor = coords.1 + 1;

    let locked = edit.target_locked(coords.0, coords.1);
    let mapped = edit.plan.map(style_idx, locked).ok_or_else(|| {
        XlprotectError::FileFormat(format!(
            "cell style index {style_idx} is not declared in the stylesheet"
        ))
    })?;

    let mut elem = e.to_owned();
    elem.clear_attributes();
    let mapped_value = mapped.to_string();
    let mut wrote_s = false;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"s" {
            elem.push_attribute(("s", mapped_value.as_str()));
            wrote_s = true;
        } else {
            elem.push_attribute(Attribute {
                key: attr.key,
                value: attr.value.clone(),
            });
        }
    }
    if !wrote_s && mapped != 0 {
        elem.push_attribute(("s", mapped_value.as_str()));
    }

    Ok(elem)
}

/// Replace or disable an existing `<sheetProtection>` element.
fn write_protection(
    writer: &mut Writer<Vec<u8>>,
    existing: &BytesStart<'_>,
    edit: ProtectionEdit<'_>,
) -> Result<()> {
    match edit {
        ProtectionEdit::Enable { password_hash } => {
            let mut elem = existing.to_owned();
            elem.clear_attributes();
            push_enable_attrs(&mut elem, password_hash);
            writer.write_event(Event::Empty(elem))?;
        }
        ProtectionEdit::Disable | ProtectionEdit::DisableAndClearPassword => {
            let clear_password = matches!(edit, ProtectionEdit::DisableAndClearPassword);
            let mut elem = existing.to_owned();
            elem.clear_attributes();
            elem.push_attribute(("sheet", "0"));
            for attr in existing.attributes().flatten() {
                let key = attr.key.as_ref();
                if key == b"sheet" {
                    continue; // rewritten above
                }
                let is_password_attr = matches!(
                    key,
                    b"password" | b"hashValue" | b"algorithmName" | b"saltValue" | b"spinCount"
                );
                if clear_password && is_password_attr {
                    continue;
                }
                elem.push_attribute(Attribute {
                    key: attr.key,
                    value: attr.value.clone(),
                });
            }
            writer.write_event(Event::Empty(elem))?;
        }
    }
    Ok(())
}

/// Insert a fresh `<sheetProtection>` right after `</sheetData>`.
///
/// Returns whether an element was written. Disabling edits insert nothing;
/// an existing element further down the sheet (its schema-valid position)
/// must still reach [`write_protection`], so the caller may not treat a
/// no-op insert as emitted.
fn insert_protection_after(
    writer: &mut Writer<Vec<u8>>,
    sheet_data_name: &[u8],
    edit: ProtectionEdit<'_>,
) -> Result<bool> {
    let ProtectionEdit::Enable { password_hash } = edit else {
        return Ok(false);
    };
    let prefix = sheet_data_name
        .strip_suffix(b"sheetData")
        .map(|p| String::from_utf8_lossy(p).to_string())
        .unwrap_or_default();
    let mut elem = BytesStart::new(format!("{prefix}sheetProtection"));
    push_enable_attrs(&mut elem, password_hash);
    writer.write_event(Event::Empty(elem))?;
    Ok(true)
}

fn push_enable_attrs(elem: &mut BytesStart<'_>, password_hash: &str) {
    elem.push_attribute(("sheet", "1"));
    elem.push_attribute(("objects", "1"));
    elem.push_attribute(("scenarios", "1"));
    elem.push_attribute(("password", password_hash));
}
