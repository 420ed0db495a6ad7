//! Resolving user-supplied row and column tokens into lockable target sets.
//!
//! Rows and columns arrive as comma-separated strings ("2,7" / "B,AA"), the
//! same shape the preferences store keeps them in. Resolution happens before
//! any file I/O so a malformed token never touches the workbook.

use std::collections::BTreeSet;

use crate::cell_ref::column_index;
use crate::error::{Result, XlprotectError};

/// Resolved selection criteria for a protect run.
///
/// Rows and columns are stored 0-indexed to match the coordinates the
/// worksheet scanner produces. Empty sets are valid (e.g., only
/// formula-protection requested).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<u32>,
    cols: BTreeSet<u32>,
}

impl Selection {
    /// Resolve row numbers (1-based) and column letters into a selection.
    pub fn resolve<R, C>(rows: R, columns: C) -> Result<Self>
    where
        R: IntoIterator<Item = u32>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut selection = Self::default();
        for row in rows {
            if row == 0 {
                return Err(XlprotectError::InvalidSelection(
                    "row numbers are 1-based; 0 is not a valid row".to_string(),
                ));
            }
            selection.rows.insert(row - 1);
        }
        for letters in columns {
            let letters = letters.as_ref();
            let col = column_index(letters).ok_or_else(|| {
                XlprotectError::InvalidSelection(format!(
                    "not a valid column letter: {letters:?}"
                ))
            })?;
            selection.cols.insert(col - 1);
        }
        Ok(selection)
    }

    /// Parse comma-separated row and column token strings.
    ///
    /// This is the entry point for preference-store values and CLI flags.
    /// Empty strings resolve to empty selections.
    pub fn parse(row_tokens: &str, col_tokens: &str) -> Result<Self> {
        Self::resolve(parse_row_list(row_tokens)?, parse_column_list(col_tokens))
    }

    /// Whether any row or column is selected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    /// Whether the 0-indexed row is selected.
    pub fn contains_row(&self, row: u32) -> bool {
        self.rows.contains(&row)
    }

    /// Whether the 0-indexed column is selected.
    pub fn contains_col(&self, col: u32) -> bool {
        self.cols.contains(&col)
    }
}

/// Parse a comma-separated list of 1-based row numbers.
///
/// Whitespace around tokens is ignored; an empty string yields no rows.
pub fn parse_row_list(tokens: &str) -> Result<Vec<u32>> {
    let mut rows = Vec::new();
    for token in tokens.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let row: u32 = token.parse().map_err(|_| {
            XlprotectError::InvalidSelection(format!("not a valid row number: {token:?}"))
        })?;
        if row == 0 {
            return Err(XlprotectError::InvalidSelection(
                "row numbers are 1-based; 0 is not a valid row".to_string(),
            ));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Split a comma-separated list of column letters into tokens.
///
/// Validation of each token happens in [`Selection::resolve`].
pub fn parse_column_list(tokens: &str) -> Vec<String> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}
