#![no_main]

//! Fuzz target for caller-supplied template trees.
//!
//! Arbitrary paths and contents must either be rejected while building the tree or
//! produce an archive; conversions with an accepted tree never fail on the template.

use std::sync::Arc;

use arbitrary::Arbitrary;
use excelr_core::{to_excel_bytes, ErrorKind, ExcelOptions, TemplateTree};
use libfuzzer_sys::fuzz_target;

const STYLES: &str = "xl/styles.xml";
const WORKSHEET: &str = "xl/worksheets/sheet1.xml";

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    extra: Vec<(String, Vec<u8>)>,
    styles_prefix: String,
    styles_suffix: String,
    sheet_prefix: String,
    keep_markers: bool,
    rows: Vec<Vec<i64>>,
}

fuzz_target!(|input: FuzzInput| {
    let markers = if input.keep_markers {
        "<!--excelr:numFmts--><!--excelr:cellXfs-->"
    } else {
        "<!--excelr:numFmts-->"
    };
    let styles = format!("{}{}{}", input.styles_prefix, markers, input.styles_suffix);
    let sheet = format!("{}<sheetData>", input.sheet_prefix);
    let marked = styles.contains("<!--excelr:cellXfs-->");

    let mut entries: Vec<(String, Vec<u8>)> = input.extra.into_iter().take(16).collect();
    entries.push((STYLES.to_string(), styles.into_bytes()));
    entries.push((WORKSHEET.to_string(), sheet.into_bytes()));

    let tree = match TemplateTree::from_entries(entries) {
        Ok(tree) => tree,
        Err(e) => {
            assert_eq!(e.kind(), ErrorKind::Template);
            return;
        }
    };
    assert!(marked, "tree without cellXfs placeholder was accepted");

    let options = ExcelOptions::new().with_template(Arc::new(tree));
    let rows: Vec<Vec<i64>> = input.rows.into_iter().take(20).collect();
    if let Err(e) = to_excel_bytes(rows, &options) {
        // paths like "a" and "a/b" cannot both be staged on disk
        assert_ne!(e.kind(), ErrorKind::Template, "{e}");
    }
});
