use std::collections::BTreeMap;
use std::io::{self, Cursor};

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use excelr_core::{to_excel, CellValue, CompressionLevel, ExcelOptions, OverflowPolicy, RowWriter, StyleTable};

const COLUMNS: usize = 10;

fn make_row(i: usize) -> Vec<CellValue> {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.checked_add_days(chrono::Days::new((i % 365) as u64)));
    vec![
        CellValue::from(format!("Row {i}")),
        CellValue::Integer(i as i64),
        CellValue::Float(i as f64 * 1.5),
        CellValue::Float((i % 100) as f64 / 100.0),
        CellValue::Boolean(i % 2 == 0),
        day.map_or(CellValue::Empty, CellValue::Date),
        CellValue::Empty,
        CellValue::from("constant text"),
        CellValue::Integer(-(i as i64)),
        CellValue::Float(1.0 / (i as f64 + 1.0)),
    ]
}

fn bench_row_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_encoding");
    let formats: BTreeMap<usize, String> = [(3, "0.00%".to_string()), (5, "yyyy-mm-dd".to_string())].into_iter().collect();
    let styles = StyleTable::new(&formats);
    let coalesce = CellValue::from("-");

    for rows in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements((rows * COLUMNS) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut writer = RowWriter::new(io::sink(), &styles, &coalesce, OverflowPolicy::Error);
                writer.write_rows((0..rows).map(make_row)).unwrap();
                black_box(writer.rows_written())
            })
        });
    }
    group.finish();
}

fn bench_workbook(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_excel");
    group.sample_size(20);

    for level in [CompressionLevel::None, CompressionLevel::Fast, CompressionLevel::Default] {
        let options = ExcelOptions::new()
            .with_column_formats([(3, "0.00%"), (5, "yyyy-mm-dd")])
            .with_compression(level);
        group.bench_with_input(BenchmarkId::new("10k_rows", format!("{level:?}")), &options, |b, options| {
            b.iter(|| {
                let out = to_excel(Cursor::new(Vec::new()), (0..10_000).map(make_row), options).unwrap();
                black_box(out.into_inner().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_row_encoding, bench_workbook);
criterion_main!(benches);
