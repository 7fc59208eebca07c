//! The scratch directory a conversion stages into is gone once it returns.

use std::cell::Cell;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use excelr_core::{
    to_excel_bytes, try_to_excel, CellValue, ExcelOptions, ExcelrError, ErrorKind, Stage, MAX_COLUMNS,
};
use tempfile::TempDir;

fn entries(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn scratch_parent() -> (TempDir, ExcelOptions) {
    let parent = tempfile::tempdir().unwrap();
    let options = ExcelOptions::new().with_scratch_dir(parent.path());
    (parent, options)
}

#[test]
fn test_scratch_removed_after_success() {
    let (parent, options) = scratch_parent();
    let bytes = to_excel_bytes(vec![vec![1i64, 2], vec![3, 4]], &options).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn test_scratch_exists_while_rows_stream() {
    let (parent, options) = scratch_parent();
    let seen = Cell::new(Vec::new());
    let rows = (0..2).map(|i| {
        if i == 1 {
            seen.set(entries(parent.path()));
        }
        vec![i]
    });
    to_excel_bytes(rows, &options).unwrap();

    let seen = seen.take();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("excelr-"), "{seen:?}");
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn test_scratch_removed_after_non_finite_number() {
    let (parent, options) = scratch_parent();
    let rows = vec![vec![CellValue::Float(1.0)], vec![CellValue::Float(f64::NAN)]];
    let err = to_excel_bytes(rows, &options).unwrap_err();
    assert!(matches!(err, ExcelrError::NonFiniteNumber { .. }));
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn test_scratch_removed_after_row_source_error() {
    let (parent, options) = scratch_parent();
    let rows: Vec<excelr_core::Result<Vec<i64>>> =
        vec![Ok(vec![1]), Err(ExcelrError::RowSource("connection reset".to_string()))];
    let err = try_to_excel(Cursor::new(Vec::new()), rows, &options).unwrap_err();
    assert!(matches!(err, ExcelrError::RowSource(_)));
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn test_scratch_removed_after_column_overflow() {
    let (parent, options) = scratch_parent();
    let err = to_excel_bytes(vec![vec![0i64; MAX_COLUMNS + 1]], &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn test_missing_scratch_parent_fails_while_staging() {
    let parent = tempfile::tempdir().unwrap();
    let options = ExcelOptions::new().with_scratch_dir(parent.path().join("missing"));
    let err = to_excel_bytes(vec![vec![1i64]], &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.stage(), Some(Stage::Staging));
}
