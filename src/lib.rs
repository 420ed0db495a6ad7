//! xlprotect - selective cell locking for XLSX workbooks
//!
//! Locks and unlocks cells by row, column, or formula content across every
//! sheet of a workbook in one pass, with optional sheet-level passwords:
//! - Baseline reset: every run starts from "all cells unlocked"
//! - Row/column/formula selections re-lock exactly the requested cells
//! - Untouched archive parts (formatting, charts, strings) round-trip
//!   byte-identical
//! - Atomic write-back: a failed run never leaves a half-protected file
//!
//! # Usage
//!
//! ```no_run
//! use xlprotect::{protect, ProtectRequest};
//!
//! let request = ProtectRequest::new()
//!     .with_rows([2])
//!     .with_columns(["B"])
//!     .with_password("secret");
//! protect("book.xlsx", &request)?;
//! # Ok::<(), xlprotect::XlprotectError>(())
//! ```

pub mod cell_ref;
pub mod error;
pub mod password;
pub mod prefs;
pub mod request;
pub mod selection;

mod parser;
mod patch;
mod plan;

use std::path::Path;

pub use error::{Result, XlprotectError};
pub use prefs::Preferences;
pub use request::{ProtectRequest, UnprotectRequest};
pub use selection::Selection;

/// Protect a workbook file in place.
///
/// Resolves the request's selections (failing fast before the file is
/// opened), rewrites every sheet in memory, and atomically replaces the
/// file. See [`ProtectRequest`] for the parameters.
///
/// # Errors
/// [`XlprotectError::InvalidSelection`] for malformed row/column tokens,
/// format errors if the file is not a valid workbook, and
/// [`XlprotectError::Persistence`] if the write-back fails (the original
/// file is left untouched in every error case).
pub fn protect(path: impl AsRef<Path>, request: &ProtectRequest) -> Result<()> {
    let path = path.as_ref();
    let selection = request.selection()?;
    let data = read_workbook(path)?;
    let output = patch::protect_bytes(
        &data,
        &selection,
        request.password.as_deref(),
        request.protect_formulas,
    )?;
    patch::persist(path, &output)
}

/// Remove protection from a workbook file in place.
///
/// Unlocks every cell on every sheet and disables sheet-level protection.
/// The request's password is never verified; it only controls whether the
/// stored password hashes are cleared.
///
/// # Errors
/// Format errors if the file is not a valid workbook, and
/// [`XlprotectError::Persistence`] if the write-back fails.
pub fn unprotect(path: impl AsRef<Path>, request: &UnprotectRequest) -> Result<()> {
    let path = path.as_ref();
    let data = read_workbook(path)?;
    let output = patch::unprotect_bytes(&data, request.password.is_some())?;
    patch::persist(path, &output)
}

/// Protect workbook bytes without touching the filesystem.
///
/// This is the pure core of [`protect`]; callers own persistence.
///
/// # Errors
/// As [`protect`], minus persistence.
pub fn protect_bytes(data: &[u8], request: &ProtectRequest) -> Result<Vec<u8>> {
    let selection = request.selection()?;
    patch::protect_bytes(
        data,
        &selection,
        request.password.as_deref(),
        request.protect_formulas,
    )
}

/// Unprotect workbook bytes without touching the filesystem.
///
/// # Errors
/// As [`unprotect`], minus persistence.
pub fn unprotect_bytes(data: &[u8], request: &UnprotectRequest) -> Result<Vec<u8>> {
    patch::unprotect_bytes(data, request.password.is_some())
}

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn read_workbook(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        XlprotectError::FileFormat(format!("cannot read {}: {e}", path.display()))
    })
}
