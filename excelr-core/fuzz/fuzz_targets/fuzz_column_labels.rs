#![no_main]

//! Fuzz target for column labels.
//!
//! Every index either maps to a label that decodes back to it or lies past the last
//! addressable column.

use excelr_core::{column_label, column_to_letter, MAX_COLUMNS};
use libfuzzer_sys::fuzz_target;

fn decode(label: &str) -> usize {
    label
        .bytes()
        .fold(0, |acc, b| acc * 26 + usize::from(b - b'A' + 1))
}

fuzz_target!(|index: usize| {
    match column_label(index) {
        Some(label) => {
            assert!(index < MAX_COLUMNS);
            assert!((1..=3).contains(&label.len()), "{label}");
            assert!(label.bytes().all(|b| b.is_ascii_uppercase()), "{label}");
            assert_eq!(decode(label), index + 1);
            assert_eq!(column_to_letter(index as u32 + 1), label);
        }
        None => assert!(index >= MAX_COLUMNS),
    }
});
