//! Column labels for cell addresses.

use once_cell::sync::Lazy;

/// Number of addressable columns: every one- to three-letter label (A..ZZZ).
pub const MAX_COLUMNS: usize = 18_278;
/// Maximum row number in Excel.
pub const MAX_ROW: u32 = 1_048_576;

static COLUMN_LABELS: Lazy<Vec<Box<str>>> = Lazy::new(|| {
    (1..=MAX_COLUMNS as u32)
        .map(|col| column_to_letter(col).into_boxed_str())
        .collect()
});

/// Label for a 0-based column index, or `None` past [`MAX_COLUMNS`].
#[inline]
pub fn column_label(index: usize) -> Option<&'static str> {
    COLUMN_LABELS.get(index).map(|label| &**label)
}

/// All addressable column labels in order: A, B, .., Z, AA, .., ZZZ.
///
/// Each call starts from `A` again.
pub fn column_labels() -> impl Iterator<Item = &'static str> {
    COLUMN_LABELS.iter().map(|label| &**label)
}

/// Convert column number (1-indexed) to letters (e.g., 1 -> "A", 28 -> "AB").
pub fn column_to_letter(column: u32) -> String {
    let mut result = String::new();
    let mut col = column;

    while col > 0 {
        col -= 1;
        let letter = (b'A' + (col % 26) as u8) as char;
        result.insert(0, letter);
        col /= 26;
    }

    result
}
