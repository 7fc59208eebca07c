//! Python file objects as archive sinks.

use std::io::{self, Seek, SeekFrom, Write};

use pyo3::prelude::*;
use pyo3::types::PyBytes;

fn io_error(err: PyErr) -> io::Error {
    io::Error::other(err)
}

/// A binary file-like object driven through its `write`, `seek` and `flush` methods.
pub struct PyFileSink<'py> {
    file: Bound<'py, PyAny>,
}

impl<'py> PyFileSink<'py> {
    pub fn new(file: Bound<'py, PyAny>) -> Self {
        PyFileSink { file }
    }

    /// Whether the object can be repositioned while the archive is written.
    pub fn is_seekable(file: &Bound<'py, PyAny>) -> PyResult<bool> {
        if file.hasattr("seekable")? {
            return file.call_method0("seekable")?.is_truthy();
        }
        Ok(file.hasattr("seek")? && file.hasattr("tell")?)
    }

    /// Hand a finished archive to an object that cannot seek, in one `write` call.
    pub fn write_once(file: &Bound<'py, PyAny>, bytes: &[u8]) -> PyResult<()> {
        file.call_method1("write", (PyBytes::new(file.py(), bytes),))?;
        Ok(())
    }
}

impl Write for PyFileSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self
            .file
            .call_method1("write", (PyBytes::new(self.file.py(), buf),))
            .map_err(io_error)?;
        // buffered writers may return None
        if written.is_none() {
            Ok(buf.len())
        } else {
            written.extract::<usize>().map_err(io_error)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.file.hasattr("flush").map_err(io_error)? {
            self.file.call_method0("flush").map_err(io_error)?;
        }
        Ok(())
    }
}

impl Seek for PyFileSink<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek offset too large"))?;
                (n, 0)
            }
            SeekFrom::Current(n) => (n, 1),
            SeekFrom::End(n) => (n, 2),
        };
        self.file
            .call_method1("seek", (offset, whence))
            .and_then(|pos| pos.extract::<u64>())
            .map_err(io_error)
    }
}
