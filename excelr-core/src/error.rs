//! Error types for excelr-core.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExcelrError>;

/// Pipeline stage an I/O failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Copying the template tree into the scratch directory.
    Staging,
    /// Rewriting the staged styles document.
    Styles,
    /// Appending row XML to the staged worksheet.
    Rows,
    /// Reading staged files back into the archive.
    Packaging,
    /// Writing to the caller's output sink.
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Staging => "staging templates",
            Stage::Styles => "writing styles",
            Stage::Rows => "writing rows",
            Stage::Packaging => "packaging archive",
            Stage::Output => "writing output",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an [`ExcelrError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller handed in data that cannot be represented.
    Input,
    /// Reading the row source or writing files failed.
    Io,
    /// The template assets are missing a file or placeholder.
    Template,
}

/// Errors raised while producing a spreadsheet.
#[derive(Debug, Error)]
pub enum ExcelrError {
    #[error("I/O error while {stage}: {source}")]
    Io {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("row source failed: {0}")]
    RowSource(String),

    #[error("row {row} has {columns} values but only {max} columns are addressable", max = crate::utils::MAX_COLUMNS)]
    ColumnOverflow { row: u32, columns: usize },

    #[error("row {row} exceeds the sheet row limit ({max})", max = crate::utils::MAX_ROW)]
    RowOverflow { row: u64 },

    #[error("cell {cell} holds a non-finite number")]
    NonFiniteNumber { cell: String },

    #[error("cell {cell} holds an integer that is not plain decimal digits: {text:?}")]
    MalformedInteger { cell: String, text: String },

    #[error("malformed template: {0}")]
    Template(String),
}

impl ExcelrError {
    /// Build a template error from any message.
    pub fn template<S: Into<String>>(msg: S) -> Self {
        ExcelrError::Template(msg.into())
    }

    /// Which side is at fault: the caller's data, the environment, or the packaged assets.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExcelrError::Io { .. } | ExcelrError::Zip(_) | ExcelrError::RowSource(_) => ErrorKind::Io,
            ExcelrError::ColumnOverflow { .. }
            | ExcelrError::RowOverflow { .. }
            | ExcelrError::NonFiniteNumber { .. }
            | ExcelrError::MalformedInteger { .. } => ErrorKind::Input,
            ExcelrError::Template(_) => ErrorKind::Template,
        }
    }

    /// The stage an I/O error was raised in, if known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ExcelrError::Io { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExcelrError {
    fn from(source: std::io::Error) -> Self {
        ExcelrError::Io { stage: Stage::Output, source }
    }
}

/// Attach a [`Stage`] to raw I/O results.
pub(crate) trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageContext<T> for std::result::Result<T, std::io::Error> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|source| ExcelrError::Io { stage, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = ExcelrError::ColumnOverflow { row: 3, columns: 20_000 };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(ExcelrError::template("missing xl/styles.xml").kind(), ErrorKind::Template);

        let io: Result<()> = Err(std::io::Error::other("disk full")).stage(Stage::Rows);
        let err = io.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.stage(), Some(Stage::Rows));
        assert!(err.to_string().contains("writing rows"));
    }

    #[test]
    fn test_bare_io_error_defaults_to_output_stage() {
        let err: ExcelrError = std::io::Error::other("broken pipe").into();
        assert_eq!(err.stage(), Some(Stage::Output));
    }
}
