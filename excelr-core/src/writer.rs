//! Cell and row XML for the worksheet body.
//!
//! Rows are rendered one at a time into a reusable buffer and handed to the sink, so
//! memory use does not grow with the number of rows.

use std::borrow::Cow;
use std::io::Write;

use log::{debug, warn};
use quick_xml::escape::partial_escape;

use crate::cell::CellValue;
use crate::error::{ExcelrError, Result, Stage, StageContext};
use crate::options::OverflowPolicy;
use crate::serial::{date_serial, datetime_serial, time_fraction};
use crate::style::StyleTable;
use crate::utils::{column_label, MAX_COLUMNS, MAX_ROW};

/// Escape text for element content. Only `&`, `<` and `>` need escaping there.
#[inline]
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    partial_escape(raw)
}

fn push_cell_open(buf: &mut String, label: &str, row: u32, style: u32) {
    let mut row_buf = itoa::Buffer::new();
    let mut style_buf = itoa::Buffer::new();
    buf.push_str("<c r=\"");
    buf.push_str(label);
    buf.push_str(row_buf.format(row));
    buf.push_str("\" s=\"");
    buf.push_str(style_buf.format(style));
    buf.push('"');
}

fn push_number(buf: &mut String, label: &str, row: u32, style: u32, value: &str) {
    push_cell_open(buf, label, row, style);
    buf.push_str(" t=\"n\"><v>");
    buf.push_str(value);
    buf.push_str("</v></c>");
}

fn push_float(buf: &mut String, label: &str, row: u32, style: u32, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ExcelrError::NonFiniteNumber {
            cell: format!("{}{}", label, row),
        });
    }
    let mut ryu_buf = ryu::Buffer::new();
    push_number(buf, label, row, style, ryu_buf.format_finite(value));
    Ok(())
}

fn is_decimal_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Append the `<c>` element for one value.
///
/// `label` is the column label and `row` the 1-based row number; `style` is the style
/// index from the [`StyleTable`]. [`CellValue::Empty`] produces a cell without a value.
pub fn write_cell(buf: &mut String, label: &str, row: u32, style: u32, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Empty => {
            push_cell_open(buf, label, row, style);
            buf.push_str("/>");
        }
        CellValue::Boolean(b) => {
            push_number(buf, label, row, style, if *b { "1" } else { "0" });
        }
        CellValue::Integer(n) => {
            let mut int_buf = itoa::Buffer::new();
            push_number(buf, label, row, style, int_buf.format(*n));
        }
        CellValue::BigInteger(digits) => {
            if !is_decimal_integer(digits) {
                return Err(ExcelrError::MalformedInteger {
                    cell: format!("{}{}", label, row),
                    text: digits.clone(),
                });
            }
            push_number(buf, label, row, style, digits);
        }
        CellValue::Float(f) => push_float(buf, label, row, style, *f)?,
        CellValue::Date(d) => {
            let mut int_buf = itoa::Buffer::new();
            push_number(buf, label, row, style, int_buf.format(date_serial(*d)));
        }
        CellValue::Time(t) => push_float(buf, label, row, style, time_fraction(*t))?,
        CellValue::DateTime(dt) => push_float(buf, label, row, style, datetime_serial(*dt))?,
        CellValue::Text(s) => {
            push_cell_open(buf, label, row, style);
            buf.push_str(" t=\"inlineStr\"><is>");
            // leading/trailing whitespace is dropped by readers unless marked
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                buf.push_str("<t xml:space=\"preserve\">");
            } else {
                buf.push_str("<t>");
            }
            buf.push_str(&escape_text(s));
            buf.push_str("</t></is></c>");
        }
    }
    Ok(())
}

/// Streams `<row>` elements into a worksheet sink.
pub struct RowWriter<'a, W: Write> {
    sink: W,
    styles: &'a StyleTable,
    coalesce: &'a CellValue,
    overflow: OverflowPolicy,
    rows_written: u32,
    buf: String,
}

impl<'a, W: Write> RowWriter<'a, W> {
    /// Create a writer appending to `sink`.
    pub fn new(sink: W, styles: &'a StyleTable, coalesce: &'a CellValue, overflow: OverflowPolicy) -> Self {
        RowWriter {
            sink,
            styles,
            coalesce,
            overflow,
            rows_written: 0,
            buf: String::with_capacity(4096),
        }
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Give back the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Write the next row. Row numbers follow call order, starting at 1.
    pub fn write_row<R, V>(&mut self, values: R) -> Result<()>
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        if self.rows_written >= MAX_ROW {
            return Err(ExcelrError::RowOverflow {
                row: u64::from(self.rows_written) + 1,
            });
        }
        let row_num = self.rows_written + 1;

        self.buf.clear();
        let mut row_buf = itoa::Buffer::new();
        self.buf.push_str("<row r=\"");
        self.buf.push_str(row_buf.format(row_num));
        self.buf.push_str("\">");

        let mut values = values.into_iter();
        for col_idx in 0.. {
            let Some(value) = values.next() else { break };
            let Some(label) = column_label(col_idx) else {
                match self.overflow {
                    OverflowPolicy::Error => {
                        return Err(ExcelrError::ColumnOverflow {
                            row: row_num,
                            columns: MAX_COLUMNS + 1 + values.by_ref().count(),
                        });
                    }
                    OverflowPolicy::Truncate => {
                        warn!("row {row_num}: dropping values past column {MAX_COLUMNS}");
                        break;
                    }
                }
            };

            let value: CellValue = value.into();
            let value = if value.is_empty() { self.coalesce } else { &value };
            write_cell(&mut self.buf, label, row_num, self.styles.style_index(col_idx), value)?;
        }

        self.buf.push_str("</row>");
        self.sink.write_all(self.buf.as_bytes()).stage(Stage::Rows)?;
        self.rows_written = row_num;
        Ok(())
    }

    /// Write every row of a fallible row source, stopping at the first error.
    pub fn try_write_rows<I, R, V>(&mut self, rows: I) -> Result<u32>
    where
        I: IntoIterator<Item = Result<R>>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        for row in rows {
            self.write_row(row?)?;
        }
        debug!("wrote {} rows", self.rows_written);
        Ok(self.rows_written)
    }

    /// Write every row of a row source.
    pub fn write_rows<I, R, V>(&mut self, rows: I) -> Result<u32>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.try_write_rows(rows.into_iter().map(Ok))
    }
}
