//! Request objects for the two core operations.
//!
//! These decouple the mutators from any UI: a caller (CLI, GUI, service)
//! builds a request and hands it to [`crate::protect`] or
//! [`crate::unprotect`]. Selection tokens stay unresolved here; resolution
//! (and its error reporting) happens when the request is executed.

use crate::error::Result;
use crate::selection::Selection;

/// Parameters for a protect run.
#[derive(Debug, Clone)]
pub struct ProtectRequest {
    pub(crate) rows: Vec<u32>,
    pub(crate) columns: Vec<String>,
    pub(crate) password: Option<String>,
    pub(crate) protect_formulas: bool,
}

impl Default for ProtectRequest {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            password: None,
            protect_formulas: true,
        }
    }
}

impl ProtectRequest {
    /// A request with no selections, no password, and formula protection on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every cell in these rows (1-based row numbers).
    pub fn with_rows<I: IntoIterator<Item = u32>>(mut self, rows: I) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    /// Lock every cell in these columns (letter identifiers, e.g. "B", "AA").
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Enable sheet-level protection with this password on every sheet.
    ///
    /// An empty password is treated as no password: cells still carry their
    /// locked flags, but sheet protection stays disabled.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = if password.is_empty() {
            None
        } else {
            Some(password.to_string())
        };
        self
    }

    /// Whether cells holding formulas are locked (default true).
    pub fn protect_formulas(mut self, enabled: bool) -> Self {
        self.protect_formulas = enabled;
        self
    }

    /// Resolve the row/column tokens, failing fast on malformed input.
    pub(crate) fn selection(&self) -> Result<Selection> {
        Selection::resolve(self.rows.iter().copied(), &self.columns)
    }
}

/// Parameters for an unprotect run.
#[derive(Debug, Clone, Default)]
pub struct UnprotectRequest {
    pub(crate) password: Option<String>,
}

impl UnprotectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the stored sheet password hashes as well as the protection flag.
    ///
    /// The supplied password is never verified against the stored hash;
    /// unprotection succeeds regardless. It only decides whether the stored
    /// hash attributes are stripped from the sheets.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = if password.is_empty() {
            None
        } else {
            Some(password.to_string())
        };
        self
    }
}
