//! Protection patch pipeline.
//!
//! Produces a modified workbook by rewriting the styles part and every
//! worksheet, then patching the original ZIP archive. All mutation happens
//! on in-memory bytes; nothing reaches disk until every sheet has been
//! rewritten, and the write-back goes through a temp file + rename so a
//! failure never leaves a half-protected file behind.

pub(crate) mod sheet_patcher;
pub(crate) mod styles_writer;
pub(crate) mod zip_patcher;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::error::{Result, XlprotectError};
use crate::parser;
use crate::password::hash_password;
use crate::plan::StylePlan;
use crate::selection::Selection;

use sheet_patcher::{ProtectionEdit, SheetEdit};

/// Apply a protect run to workbook bytes (pure bytes in, bytes out).
pub(crate) fn protect_bytes(
    data: &[u8],
    selection: &Selection,
    password: Option<&str>,
    protect_formulas: bool,
) -> Result<Vec<u8>> {
    let hash = password.map(hash_password);
    let protection = match hash.as_deref() {
        Some(password_hash) => ProtectionEdit::Enable { password_hash },
        None => ProtectionEdit::Disable,
    };

    rewrite_workbook(data, |archive, sheet_path, plan| {
        let formula_cells = if protect_formulas {
            Some(parser::worksheet::scan_formula_cells(archive, sheet_path)?)
        } else {
            None
        };
        let original = read_part(archive, sheet_path)?;
        let edit = SheetEdit {
            plan,
            selection: Some(selection),
            formula_cells: formula_cells.as_ref(),
            protection,
        };
        sheet_patcher::rewrite_sheet(&original, &edit)
    })
}

/// Apply an unprotect run to workbook bytes.
///
/// `clear_password` controls whether stored password hashes are stripped;
/// the supplied password is never verified (see `UnprotectRequest`).
pub(crate) fn unprotect_bytes(data: &[u8], clear_password: bool) -> Result<Vec<u8>> {
    let protection = if clear_password {
        ProtectionEdit::DisableAndClearPassword
    } else {
        ProtectionEdit::Disable
    };

    rewrite_workbook(data, |archive, sheet_path, plan| {
        let original = read_part(archive, sheet_path)?;
        let edit = SheetEdit {
            plan,
            selection: None,
            formula_cells: None,
            protection,
        };
        sheet_patcher::rewrite_sheet(&original, &edit)
    })
}

/// Shared pipeline: read the layout and style table, rewrite each sheet via
/// `rewrite`, rewrite the styles part, patch the archive.
fn rewrite_workbook<'a, F>(data: &'a [u8], mut rewrite: F) -> Result<Vec<u8>>
where
    F: FnMut(&mut ZipArchive<Cursor<&'a [u8]>>, &str, &StylePlan) -> Result<Vec<u8>>,
{
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)
        .map_err(|e| XlprotectError::FileFormat(format!("not an XLSX package: {e}")))?;

    let layout = parser::read_layout(&mut archive)?;
    let xfs = parser::styles::parse_cell_xfs(&mut archive, &layout.styles_path)?;
    let plan = StylePlan::build(xfs);

    let mut replacements: HashMap<String, Vec<u8>> = HashMap::new();

    for sheet in &layout.sheets {
        let rewritten = rewrite(&mut archive, &sheet.path, &plan)?;
        replacements.insert(sheet.path.clone(), rewritten);
    }

    let styles_original = read_part(&mut archive, &layout.styles_path)?;
    let styles_rewritten = styles_writer::rewrite_styles(&styles_original, plan.records())?;
    replacements.insert(layout.styles_path, styles_rewritten);

    zip_patcher::patch_archive(data, &replacements)
}

/// Read one archive entry fully into memory.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|_| XlprotectError::FileFormat(format!("missing part: {path}")))?;
    let capacity = usize::try_from(file.size()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(capacity);
    file.read_to_end(&mut bytes)
        .map_err(|e| XlprotectError::FileFormat(format!("unreadable part {path}: {e}")))?;
    Ok(bytes)
}

/// Write the new workbook bytes next to the target and atomically rename.
///
/// Any failure surfaces as `Persistence` and leaves the original file intact.
pub(crate) fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(XlprotectError::Persistence)?;
    tmp.write_all(bytes).map_err(XlprotectError::Persistence)?;
    tmp.persist(path)
        .map_err(|e| XlprotectError::Persistence(e.error))?;
    Ok(())
}
