#![no_main]

//! Fuzz target for whole conversions.
//!
//! Writes arbitrary rows and column formats, then reopens the archive and walks the
//! styles and worksheet documents with a strict XML reader.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use arbitrary::{Arbitrary, Unstructured};
use chrono::{NaiveDate, NaiveTime};
use excelr_core::{to_excel_bytes, CellValue, ExcelOptions, ExcelrError};
use libfuzzer_sys::fuzz_target;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

const MAX_ROWS: usize = 50;
const MAX_COLS: usize = 20;

#[derive(Debug, Clone)]
struct FuzzCell(CellValue);

impl<'a> Arbitrary<'a> for FuzzCell {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.int_in_range(0..=8u8)? {
            0 => CellValue::Empty,
            1 => CellValue::Boolean(u.arbitrary()?),
            2 => CellValue::Integer(u.arbitrary()?),
            3 => CellValue::Float(u.arbitrary()?),
            4 => {
                let days: i32 = u.int_in_range(0..=3_000_000)?;
                NaiveDate::from_num_days_from_ce_opt(693_595 + days).map_or(CellValue::Empty, CellValue::Date)
            }
            5 => {
                let secs: u32 = u.int_in_range(0..=86_399)?;
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).map_or(CellValue::Empty, CellValue::Time)
            }
            6 => CellValue::from(u.arbitrary::<i128>()?),
            // XML cannot carry most control characters; keep text printable
            _ => {
                let s: String = u.arbitrary()?;
                CellValue::Text(s.chars().filter(|c| !c.is_control()).collect())
            }
        };
        Ok(FuzzCell(value))
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    rows: Vec<Vec<FuzzCell>>,
    formats: Vec<(u8, String)>,
    coalesce: Option<FuzzCell>,
}

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("archive should open");
    let mut file = archive.by_name(name).expect("entry should exist");
    let mut s = String::new();
    file.read_to_string(&mut s).expect("entry should be UTF-8");
    s
}

/// Walk the document and count elements with the given name.
fn count_elements(xml: &str, name: &[u8]) -> usize {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == name => count += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML: {e}"),
        }
    }
    count
}

fuzz_target!(|input: FuzzInput| {
    let rows: Vec<Vec<CellValue>> = input
        .rows
        .into_iter()
        .take(MAX_ROWS)
        .map(|row| row.into_iter().take(MAX_COLS).map(|c| c.0).collect())
        .collect();
    let formats: BTreeMap<usize, String> = input
        .formats
        .into_iter()
        .map(|(col, code)| (usize::from(col) % MAX_COLS, code.chars().filter(|c| !c.is_control()).collect()))
        .collect();

    let mut options = ExcelOptions::new().with_column_formats(formats.clone());
    if let Some(coalesce) = input.coalesce {
        options = options.with_coalesce(coalesce.0);
    }

    let has_non_finite = rows
        .iter()
        .flatten()
        .chain(std::iter::once(&options.coalesce))
        .any(|v| matches!(v, CellValue::Float(f) if !f.is_finite()));

    let bytes = match to_excel_bytes(rows.clone(), &options) {
        Ok(bytes) => bytes,
        Err(ExcelrError::NonFiniteNumber { .. }) if has_non_finite => return,
        Err(e) => panic!("conversion failed: {e}"),
    };

    let sheet = read_entry(&bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(count_elements(&sheet, b"row"), rows.len());
    assert_eq!(count_elements(&sheet, b"c"), rows.iter().map(Vec::len).sum::<usize>());

    let distinct: std::collections::BTreeSet<&String> = formats.values().collect();
    let styles = read_entry(&bytes, "xl/styles.xml");
    assert_eq!(count_elements(&styles, b"numFmt"), distinct.len() + 1);
});
