//! Python bindings for excelr - write rows straight to a minimal xlsx file.
//!
//! Exposes a single `to_excel` function backed by excelr-core.

use std::collections::BTreeMap;
use std::io::{BufWriter, Cursor};
use std::path::PathBuf;

use excelr_core::{ErrorKind, ExcelOptions, ExcelrError};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;

mod convert;
mod sink;

use convert::{Coalesce, PyRows};
use sink::PyFileSink;

const SINK_BUFFER: usize = 64 * 1024;

/// Map a library error onto the matching Python exception.
fn to_py_err(err: ExcelrError) -> PyErr {
    match err.kind() {
        ErrorKind::Input => PyValueError::new_err(err.to_string()),
        ErrorKind::Io => PyOSError::new_err(err.to_string()),
        ErrorKind::Template => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Write rows to an Excel file.
///
/// Args:
///     output: File path (str or os.PathLike), or a binary file-like object with .write()
///     rows: Iterable of iterables holding the cell values of each row
///     column_format_codes: Optional dict of 0-based column index to number format code
///     coalesce: Value written for None cells; None leaves them blank
///
/// Returns:
///     The `output` argument
///
/// Example:
///     to_excel('report.xlsx', [['name', 'share'], ['a', 0.25]], {1: '0.00%'})
///     to_excel(io.BytesIO(), rows)
#[pyfunction]
#[pyo3(signature = (output, rows, column_format_codes=None, coalesce=Coalesce::default()))]
fn to_excel<'py>(
    output: Bound<'py, PyAny>,
    rows: &Bound<'py, PyAny>,
    column_format_codes: Option<BTreeMap<usize, String>>,
    coalesce: Coalesce,
) -> PyResult<Bound<'py, PyAny>> {
    let options = ExcelOptions::new()
        .with_column_formats(column_format_codes.unwrap_or_default())
        .with_coalesce(coalesce.0);
    let target = Target::resolve(&output)?;

    let mut row_error = None;
    let result = target.write(&output, PyRows::new(rows, &mut row_error)?, &options);

    // an exception from the row iterable wins over the error it caused
    if let Some(err) = row_error {
        return Err(err);
    }
    result.map_err(to_py_err)?;
    Ok(output)
}

/// Where the archive goes.
enum Target {
    Path(PathBuf),
    SeekableFile,
    StreamFile,
}

impl Target {
    fn resolve(output: &Bound<'_, PyAny>) -> PyResult<Self> {
        if output.hasattr("write")? {
            return Ok(if PyFileSink::is_seekable(output)? {
                Target::SeekableFile
            } else {
                Target::StreamFile
            });
        }
        output
            .extract::<PathBuf>()
            .map(Target::Path)
            .map_err(|_| PyTypeError::new_err("output must be a path or a binary file-like object"))
    }

    fn write(self, output: &Bound<'_, PyAny>, rows: PyRows<'_, '_>, options: &ExcelOptions) -> excelr_core::Result<()> {
        match self {
            Target::Path(path) => {
                excelr_core::try_to_excel_path(path, rows, options)?;
            }
            Target::SeekableFile => {
                let sink = BufWriter::with_capacity(SINK_BUFFER, PyFileSink::new(output.clone()));
                let sink = excelr_core::try_to_excel(sink, rows, options)?;
                sink.into_inner().map_err(|e| e.into_error())?;
            }
            Target::StreamFile => {
                let bytes = excelr_core::try_to_excel(Cursor::new(Vec::new()), rows, options)?.into_inner();
                PyFileSink::write_once(output, &bytes).map_err(std::io::Error::other)?;
            }
        }
        Ok(())
    }
}

/// The excelr Python module.
#[pymodule]
fn excelr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(to_excel, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
