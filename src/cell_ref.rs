//! Utilities for parsing Excel-style cell references and column letters.

/// Highest column index XLSX supports ("XFD"), 1-based.
pub const MAX_COL: u32 = 16_384;

/// Parse a cell reference like "A1" into (col, row) where col and row are 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Parse a cell reference from raw bytes (ASCII) into (col, row) where col and row are 0-indexed.
///
/// This is the bytes variant of [`parse_cell_ref`] for use when working with
/// raw XML attribute values (e.g., `attr.value` from quick-xml).
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = if b.is_ascii_lowercase() { b - 32 } else { b };
            col = col * 26 + (u32::from(upper - b'A') + 1);
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Convert a column letter like "A" or "AB" into its 1-based index (A=1, Z=26, AA=27).
///
/// Returns `None` for empty input, non-alphabetic characters, or columns
/// beyond "XFD" (the XLSX column limit).
pub fn column_index(letters: &str) -> Option<u32> {
    let trimmed = letters.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let upper = ch.to_ascii_uppercase();
        col = col * 26 + (upper as u32 - 'A' as u32 + 1);
        if col > MAX_COL {
            return None;
        }
    }

    Some(col)
}

/// Convert a 0-indexed column into its letter form (0 -> "A", 26 -> "AA").
///
/// `n % 26` is always below 26, so the cast to `u8` cannot truncate.
#[allow(clippy::cast_possible_truncation)]
pub fn col_to_letter(col: u32) -> String {
    let mut out = String::new();
    let mut n = col;
    loop {
        let rem = (n % 26) as u8;
        out.insert(0, char::from(b'A' + rem));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref_basic() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B3"), Some((1, 2)));
        assert_eq!(parse_cell_ref("AA10"), Some((26, 9)));
    }

    #[test]
    fn test_parse_cell_ref_absolute() {
        assert_eq!(parse_cell_ref("$C$7"), Some((2, 6)));
    }

    #[test]
    fn test_parse_cell_ref_invalid() {
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("A"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A1:B2"), None);
    }

    #[test]
    fn test_parse_cell_ref_bytes_matches_str() {
        assert_eq!(parse_cell_ref_bytes(b"D4"), parse_cell_ref("D4"));
        assert_eq!(parse_cell_ref_bytes(b"xfd1"), Some((16_383, 0)));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("Z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("AB"), Some(28));
        assert_eq!(column_index("XFD"), Some(16_384));
    }

    #[test]
    fn test_column_index_invalid() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("1A"), None);
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index("XFE"), None);
        assert_eq!(column_index("ZZZZ"), None);
    }

    #[test]
    fn test_col_to_letter_roundtrip() {
        for col in [0u32, 1, 25, 26, 27, 701, 702, 16_383] {
            let letters = col_to_letter(col);
            assert_eq!(column_index(&letters), Some(col + 1));
        }
    }
}
