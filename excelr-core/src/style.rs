//! Per-column number format styles.
//!
//! Excel stores number formats in `numFmts` and refers to them from `cellXfs`; cells in
//! turn refer to an xf by its position (`s` attribute). Only the number format varies
//! here, so there is one xf per distinct format code and xf 0 is always "General".

use std::collections::BTreeMap;
use std::fmt::Write;

use quick_xml::escape::escape;

#[cfg(feature = "fast-hash")]
type StyleMap = hashbrown::HashMap<usize, u32, ahash::RandomState>;
#[cfg(not(feature = "fast-hash"))]
type StyleMap = std::collections::HashMap<usize, u32>;

/// Format code of the default style.
pub const GENERAL: &str = "General";

/// First id of the custom number format range; ids below are built in.
pub const FIRST_CUSTOM_NUM_FMT_ID: usize = 164;

/// Unique format codes plus the column → style index lookup.
#[derive(Clone, Debug)]
pub struct StyleTable {
    /// Custom format codes in style order; style index `i + 1` uses `formats[i]`.
    formats: Vec<String>,
    by_column: StyleMap,
}

impl StyleTable {
    /// Build the table from a column → format code assignment.
    ///
    /// Codes are deduplicated in ascending column order, first occurrence wins.
    pub fn new(column_formats: &BTreeMap<usize, String>) -> Self {
        let mut formats: Vec<String> = Vec::new();
        let mut by_column = StyleMap::default();

        for (&column, code) in column_formats {
            let position = match formats.iter().position(|f| f == code) {
                Some(idx) => idx,
                None => {
                    formats.push(code.clone());
                    formats.len() - 1
                }
            };
            by_column.insert(column, position as u32 + 1);
        }

        StyleTable { formats, by_column }
    }

    /// Number of styles, General included.
    pub fn len(&self) -> usize {
        self.formats.len() + 1
    }

    /// Always false: General is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Style index for a 0-based column; 0 when the column has no format.
    #[inline]
    pub fn style_index(&self, column: usize) -> u32 {
        self.by_column.get(&column).copied().unwrap_or(0)
    }

    /// Format code behind a style index.
    pub fn format_code(&self, style_index: u32) -> Option<&str> {
        match style_index {
            0 => Some(GENERAL),
            n => self.formats.get(n as usize - 1).map(String::as_str),
        }
    }

    /// Number format id behind a style index.
    pub fn num_fmt_id(style_index: u32) -> usize {
        FIRST_CUSTOM_NUM_FMT_ID + style_index as usize
    }

    /// Format codes in style order, General first.
    pub fn format_codes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(GENERAL).chain(self.formats.iter().map(String::as_str))
    }

    /// The `<numFmts>` element.
    pub fn num_fmts_xml(&self) -> String {
        let mut xml = String::with_capacity(64 * self.len());
        let _ = write!(xml, "<numFmts count=\"{}\">", self.len());
        for (idx, code) in self.format_codes().enumerate() {
            let _ = write!(
                xml,
                "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                Self::num_fmt_id(idx as u32),
                escape(code)
            );
        }
        xml.push_str("</numFmts>");
        xml
    }

    /// The `<cellXfs>` element, one xf per number format.
    pub fn cell_xfs_xml(&self) -> String {
        let mut xml = String::with_capacity(96 * self.len());
        let _ = write!(xml, "<cellXfs count=\"{}\">", self.len());
        for idx in 0..self.len() {
            let _ = write!(
                xml,
                "<xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyNumberFormat=\"1\"/>",
                Self::num_fmt_id(idx as u32)
            );
        }
        xml.push_str("</cellXfs>");
        xml
    }
}
