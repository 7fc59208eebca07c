//! Python values and row iterators as excelr input.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use excelr_core::{CellValue, ExcelrError, DEFAULT_COALESCE};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{
    PyBool, PyDate, PyDateAccess, PyDateTime, PyFloat, PyInt, PyIterator, PyString, PyTime, PyTimeAccess,
};

fn date_parts(year: i32, month: u8, day: u8) -> PyResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .ok_or_else(|| PyTypeError::new_err(format!("invalid date {year}-{month}-{day}")))
}

fn time_parts(hour: u8, minute: u8, second: u8, micro: u32) -> PyResult<NaiveTime> {
    NaiveTime::from_hms_micro_opt(u32::from(hour), u32::from(minute), u32::from(second), micro)
        .ok_or_else(|| PyTypeError::new_err(format!("invalid time {hour}:{minute}:{second}")))
}

/// Python ints are unbounded; anything past `i128` keeps its exact decimal digits.
fn int_to_cell_value(value: &Bound<'_, PyAny>) -> PyResult<CellValue> {
    if let Ok(n) = value.extract::<i64>() {
        return Ok(CellValue::Integer(n));
    }
    if let Ok(n) = value.extract::<i128>() {
        return Ok(CellValue::from(n));
    }
    // int() first, so subclasses with their own __str__ still give digits
    let digits = value.py().get_type::<PyInt>().call1((value,))?.str()?;
    Ok(CellValue::BigInteger(digits.to_str()?.to_owned()))
}

/// Convert one Python value to a cell value.
///
/// `bool` is checked before `int` and `datetime` before `date`, since each is a subclass
/// of the latter.
pub fn python_to_cell_value(value: &Bound<'_, PyAny>) -> PyResult<CellValue> {
    if value.is_none() {
        return Ok(CellValue::Empty);
    }
    if let Ok(b) = value.downcast::<PyBool>() {
        return Ok(CellValue::Boolean(b.is_true()));
    }
    if value.is_instance_of::<PyInt>() {
        return int_to_cell_value(value);
    }
    if let Ok(f) = value.downcast::<PyFloat>() {
        return Ok(CellValue::Float(f.value()));
    }
    if let Ok(dt) = value.downcast::<PyDateTime>() {
        let date = date_parts(dt.get_year(), dt.get_month(), dt.get_day())?;
        let time = time_parts(dt.get_hour(), dt.get_minute(), dt.get_second(), dt.get_microsecond())?;
        return Ok(CellValue::DateTime(NaiveDateTime::new(date, time)));
    }
    if let Ok(d) = value.downcast::<PyDate>() {
        return Ok(CellValue::Date(date_parts(d.get_year(), d.get_month(), d.get_day())?));
    }
    if let Ok(t) = value.downcast::<PyTime>() {
        return Ok(CellValue::Time(time_parts(
            t.get_hour(),
            t.get_minute(),
            t.get_second(),
            t.get_microsecond(),
        )?));
    }
    if let Ok(s) = value.downcast::<PyString>() {
        return Ok(CellValue::Text(s.to_str()?.to_owned()));
    }

    Err(PyTypeError::new_err(format!(
        "unsupported cell value of type {}",
        value.get_type().name()?
    )))
}

/// The `coalesce` argument. Defaults to the dash placeholder; `None` leaves cells blank.
pub struct Coalesce(pub CellValue);

impl Default for Coalesce {
    fn default() -> Self {
        Coalesce(CellValue::Text(DEFAULT_COALESCE.to_string()))
    }
}

impl<'py> FromPyObject<'py> for Coalesce {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        python_to_cell_value(ob).map(Coalesce)
    }
}

/// Rows pulled from a Python iterable.
///
/// A Python exception raised while iterating or converting is kept in `error` and the
/// conversion is stopped with a row source error, so the caller can re-raise the
/// original exception.
pub struct PyRows<'py, 'a> {
    iter: Bound<'py, PyIterator>,
    error: &'a mut Option<PyErr>,
}

impl<'py, 'a> PyRows<'py, 'a> {
    pub fn new(rows: &Bound<'py, PyAny>, error: &'a mut Option<PyErr>) -> PyResult<Self> {
        Ok(PyRows {
            iter: rows.try_iter()?,
            error,
        })
    }

    fn next_row(&mut self) -> Option<PyResult<Vec<CellValue>>> {
        let row = match self.iter.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        let values = row.try_iter().and_then(|values| {
            values
                .map(|value| value.and_then(|v| python_to_cell_value(&v)))
                .collect::<PyResult<Vec<_>>>()
        });
        Some(values)
    }
}

impl Iterator for PyRows<'_, '_> {
    type Item = excelr_core::Result<Vec<CellValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_row()? {
            Ok(values) => Some(Ok(values)),
            Err(e) => {
                let message = e.to_string();
                *self.error = Some(e);
                Some(Err(ExcelrError::RowSource(message)))
            }
        }
    }
}
