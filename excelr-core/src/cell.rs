//! Cell values accepted by the row writer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A single cell value.
///
/// The set of variants is closed: every variant has exactly one encoding in
/// [`crate::writer`], and supporting a new kind of value means adding a variant here.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// Missing value, replaced by the configured coalesce value when written.
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    /// An integer outside the `i64` range, held as its exact decimal digits with an
    /// optional leading `-`.
    BigInteger(String),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Returns true for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(n: $t) -> Self {
                    CellValue::Integer(i64::from(n))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(n: $t) -> Self {
                    match i64::try_from(n) {
                        Ok(n) => CellValue::Integer(n),
                        Err(_) => CellValue::BigInteger(n.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, i128, u128);

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Float(f64::from(n))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(t: NaiveTime) -> Self {
        CellValue::Time(t)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}
