//! Helpers for reading generated workbooks back in tests.

#![allow(dead_code)]

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

/// One `<c>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub address: String,
    pub style: u32,
    pub kind: Option<String>,
    pub value: Option<String>,
}

/// One `<row>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: u32,
    pub cells: Vec<Cell>,
}

/// Number formats and cell formats from `xl/styles.xml`.
#[derive(Debug, Default)]
pub struct Styles {
    pub num_fmts_count: u32,
    pub num_fmts: Vec<(u32, String)>,
    pub cell_xfs_count: u32,
    pub xf_num_fmt_ids: Vec<u32>,
}

impl Styles {
    /// Format code a cell style index resolves to.
    pub fn format_for_style(&self, style: u32) -> Option<&str> {
        let id = *self.xf_num_fmt_ids.get(style as usize)?;
        self.num_fmts
            .iter()
            .find(|(fmt_id, _)| *fmt_id == id)
            .map(|(_, code)| code.as_str())
    }
}

pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut s = String::new();
    file.read_to_string(&mut s).unwrap();
    s
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| a.unescape_value().unwrap().into_owned())
}

/// Names of the direct children of the root element, in document order.
pub fn root_children(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut names = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                if depth == 1 {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
            }
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
    }
    names
}

pub fn sheet_rows(bytes: &[u8]) -> Vec<Row> {
    let xml = read_entry(bytes, "xl/worksheets/sheet1.xml");
    let mut reader = Reader::from_str(&xml);
    let mut rows: Vec<Row> = Vec::new();
    let mut cell: Option<Cell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => match e.name().as_ref() {
                b"row" => rows.push(Row {
                    number: attr(&e, b"r").unwrap().parse().unwrap(),
                    cells: Vec::new(),
                }),
                b"c" => cell = Some(start_cell(&e)),
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"row" => rows.push(Row {
                    number: attr(&e, b"r").unwrap().parse().unwrap(),
                    cells: Vec::new(),
                }),
                b"c" => rows.last_mut().unwrap().cells.push(start_cell(&e)),
                _ => {}
            },
            Event::Text(t) if in_value => {
                let text = t.unescape().unwrap().into_owned();
                if let Some(c) = cell.as_mut() {
                    c.value.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"v" | b"t" => {
                    in_value = false;
                    if let Some(c) = cell.as_mut() {
                        c.value.get_or_insert_with(String::new);
                    }
                }
                b"c" => {
                    if let Some(c) = cell.take() {
                        rows.last_mut().unwrap().cells.push(c);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    rows
}

fn start_cell(e: &BytesStart) -> Cell {
    Cell {
        address: attr(e, b"r").unwrap(),
        style: attr(e, b"s").unwrap().parse().unwrap(),
        kind: attr(e, b"t"),
        value: None,
    }
}

pub fn styles(bytes: &[u8]) -> Styles {
    let xml = read_entry(bytes, "xl/styles.xml");
    let mut reader = Reader::from_str(&xml);
    let mut styles = Styles::default();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"numFmts" => styles.num_fmts_count = attr(&e, b"count").unwrap().parse().unwrap(),
                b"numFmt" => styles.num_fmts.push((
                    attr(&e, b"numFmtId").unwrap().parse().unwrap(),
                    attr(&e, b"formatCode").unwrap(),
                )),
                b"cellXfs" => {
                    in_cell_xfs = true;
                    styles.cell_xfs_count = attr(&e, b"count").unwrap().parse().unwrap();
                }
                b"xf" if in_cell_xfs => styles
                    .xf_num_fmt_ids
                    .push(attr(&e, b"numFmtId").unwrap().parse().unwrap()),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Eof => break,
            _ => {}
        }
    }
    styles
}
