//! Minimal streaming xlsx writer.
//!
//! `excelr-core` turns a sequence of rows into a single-sheet `.xlsx` file. Rows are
//! written to disk as they arrive, strings are stored inline, and the only styling is
//! one number format per column.
//!
//! ```no_run
//! use excelr_core::{to_excel_path, CellValue, ExcelOptions};
//!
//! let rows = (1..=3).map(|i| vec![CellValue::from(i), CellValue::from(f64::from(i) / 4.0)]);
//! let options = ExcelOptions::new().with_column_format(1, "0.00%");
//! to_excel_path("report.xlsx", rows, &options).unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod options;
pub mod package;
pub mod serial;
pub mod style;
pub mod template;
pub mod utils;
pub mod writer;

pub use cell::CellValue;
pub use error::{ErrorKind, ExcelrError, Result, Stage};
pub use options::{CompressionLevel, ExcelOptions, OverflowPolicy, DEFAULT_COALESCE};
pub use package::{to_excel, to_excel_bytes, to_excel_path, try_to_excel, try_to_excel_path};
pub use serial::{date_serial, datetime_serial, time_fraction};
pub use style::StyleTable;
pub use template::{TemplateFile, TemplateTree};
pub use utils::{column_label, column_labels, column_to_letter, MAX_COLUMNS, MAX_ROW};
pub use writer::{write_cell, RowWriter};
