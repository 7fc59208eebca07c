//! Conversion settings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use zip::write::{ExtendedFileOptions, FileOptions};
use zip::CompressionMethod;

use crate::cell::CellValue;
use crate::template::TemplateTree;

/// Placeholder written for empty cells unless another coalesce value is configured.
pub const DEFAULT_COALESCE: &str = "-";

/// Compression level for the output archive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1)
    Fast,
    /// Default compression (deflate level 6)
    #[default]
    Default,
    /// Best compression (deflate level 9) - smallest files, slowest
    Best,
}

impl CompressionLevel {
    /// ZIP entry options for this level.
    ///
    /// Timestamps are pinned to the ZIP epoch so identical input gives identical bytes.
    pub(crate) fn file_options(self) -> FileOptions<'static, ExtendedFileOptions> {
        let options = FileOptions::default()
            .large_file(false)
            .last_modified_time(zip::DateTime::default());

        match self {
            CompressionLevel::None => options.compression_method(CompressionMethod::Stored),
            CompressionLevel::Fast => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Default => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::Best => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }
}

/// What to do with a row that has more values than addressable columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail the conversion.
    #[default]
    Error,
    /// Write the addressable prefix and drop the rest.
    Truncate,
}

/// Settings for one conversion.
#[derive(Clone, Debug)]
pub struct ExcelOptions {
    /// Number format code per 0-based column.
    pub column_formats: BTreeMap<usize, String>,
    /// Value written in place of [`CellValue::Empty`].
    pub coalesce: CellValue,
    /// Handling of rows wider than the addressable column range.
    pub overflow: OverflowPolicy,
    /// Compression level for archive entries.
    pub compression: CompressionLevel,
    /// Template tree to package; the built-in tree when unset.
    pub template: Option<Arc<TemplateTree>>,
    /// Parent of the scratch directory; the system temp directory when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        ExcelOptions {
            column_formats: BTreeMap::new(),
            coalesce: CellValue::Text(DEFAULT_COALESCE.to_string()),
            overflow: OverflowPolicy::default(),
            compression: CompressionLevel::default(),
            template: None,
            scratch_dir: None,
        }
    }
}

impl ExcelOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number format code for a 0-based column.
    pub fn with_column_format<S: Into<String>>(mut self, column: usize, code: S) -> Self {
        self.column_formats.insert(column, code.into());
        self
    }

    /// Set number format codes for several columns at once.
    pub fn with_column_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        self.column_formats
            .extend(formats.into_iter().map(|(column, code)| (column, code.into())));
        self
    }

    /// Set the value written for empty cells.
    ///
    /// Passing [`CellValue::Empty`] leaves empty cells blank.
    pub fn with_coalesce<V: Into<CellValue>>(mut self, value: V) -> Self {
        self.coalesce = value.into();
        self
    }

    /// Set the column overflow policy.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// Set the compression level.
    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.compression = level;
        self
    }

    /// Package a custom template tree instead of the built-in one.
    pub fn with_template(mut self, template: Arc<TemplateTree>) -> Self {
        self.template = Some(template);
        self
    }

    /// Stage files under `dir` instead of the system temp directory.
    pub fn with_scratch_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// The template tree this conversion packages.
    pub fn template_tree(&self) -> Arc<TemplateTree> {
        self.template.clone().unwrap_or_else(TemplateTree::builtin)
    }
}
