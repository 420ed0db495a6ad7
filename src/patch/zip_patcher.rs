//! Patch an XLSX ZIP archive with rewritten parts.
//!
//! Unmodified entries are copied via `raw_copy_file` (zero recompression
//! cost), so formatting, charts, shared strings and every other part
//! round-trip byte-identical.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::Result;

/// Rebuild the archive, substituting the entries named in `replacements`.
///
/// Returns the new XLSX file as `Vec<u8>`.
pub(crate) fn patch_archive(
    original_data: &[u8],
    replacements: &HashMap<String, Vec<u8>>,
) -> Result<Vec<u8>> {
    let cursor = Cursor::new(original_data);
    let mut archive = ZipArchive::new(cursor)?;

    let buf: Vec<u8> = Vec::with_capacity(original_data.len());
    let mut writer = ZipWriter::new(Cursor::new(buf));

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();

        if let Some(replacement) = replacements.get(name.as_str()) {
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            writer.start_file(&name, options)?;
            writer.write_all(replacement).map_err(|e| {
                crate::error::XlprotectError::Zip(zip::result::ZipError::Io(e))
            })?;
            continue;
        }

        // Pass through unmodified entry (raw copy, no re-compression)
        writer.raw_copy_file(entry)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
