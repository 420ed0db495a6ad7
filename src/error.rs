//! Structured error types for xlprotect.
//!
//! Three user-facing failure families: bad selections (nothing touched),
//! unreadable/invalid workbooks (nothing touched), and write-back failures
//! (the on-disk file is unchanged).

/// All errors that can occur while protecting or unprotecting a workbook.
#[derive(Debug, thiserror::Error)]
pub enum XlprotectError {
    /// Malformed row or column selection tokens. No file is opened.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The file is missing, unreadable, or not a valid XLSX workbook.
    #[error("not a valid workbook: {0}")]
    FileFormat(String),

    /// XML parsing error from quick-xml while reading or rewriting a part.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The workbook was mutated in memory but the write-back failed.
    /// The original file on disk is intact.
    #[error("failed to persist workbook: {0}")]
    Persistence(#[source] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlprotectError>;
