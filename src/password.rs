//! Legacy XLSX worksheet password hashing.
//!
//! The `password` attribute of `<sheetProtection>` stores a 16-bit hash of
//! the password, formatted as four uppercase hex digits. This is the weak
//! legacy scheme every spreadsheet application accepts; it gates the UI, not
//! the data. Nothing here is cryptography.

/// Hash a sheet password with the legacy 16-bit algorithm.
///
/// Characters are folded in reverse order with a rotate-and-XOR step, then
/// the length and the `0xCE4B` constant are mixed in. Truncating characters
/// and length to 16 bits is part of the legacy scheme.
#[allow(clippy::cast_possible_truncation)]
pub fn hash_password(password: &str) -> String {
    let mut hash: u16 = 0;
    for ch in password.chars().rev() {
        hash = ((hash >> 14) & 0x01) | ((hash << 1) & 0x7fff);
        hash ^= ch as u16;
    }
    hash = ((hash >> 14) & 0x01) | ((hash << 1) & 0x7fff);
    hash ^= password.len() as u16;
    hash ^= 0xCE4B;
    format!("{hash:04X}")
}
