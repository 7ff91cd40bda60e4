//! Shared test utilities and fixture generators
#![allow(dead_code)]

use clyra::pipeline::{Cell, Column, Dataset};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a dataset from `(name, cells)` pairs
pub fn dataset(columns: Vec<(&str, Vec<Cell>)>) -> Dataset {
    Dataset::new(
        columns
            .into_iter()
            .map(|(name, cells)| Column::new(name, cells))
            .collect(),
    )
    .unwrap()
}

pub fn ints(values: &[i64]) -> Vec<Cell> {
    values.iter().copied().map(Cell::Int).collect()
}

pub fn nums(values: &[Option<f64>]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| v.map_or(Cell::Null, Cell::Number))
        .collect()
}

pub fn texts(values: &[Option<&str>]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
        .collect()
}

/// Three rows over columns A, B, C
///
/// - `A`: integers 1..=3
/// - `B`: text
/// - `C`: floats
pub fn create_abc_dataset() -> Dataset {
    dataset(vec![
        ("A", ints(&[1, 2, 3])),
        ("B", texts(&[Some("x"), Some("y"), Some("z")])),
        ("C", nums(&[Some(0.5), Some(1.5), Some(2.5)])),
    ])
}

/// A small raw "customers" import with the usual mess
///
/// - `id`: unique integers
/// - `name`: padded, mixed-case text with punctuation
/// - `city`: categorical with one null
/// - `income`: numeric text with thousands separators and a null
/// - `signup`: ISO dates with one unparsable entry
/// - rows 0 and 3 are exact duplicates apart from `id`
pub fn create_customers_dataset() -> Dataset {
    dataset(vec![
        ("id", ints(&[1, 2, 3, 4, 5])),
        (
            "name",
            texts(&[
                Some("  Alice!  "),
                Some("BOB"),
                Some("carol   smith"),
                Some("  Alice!  "),
                None,
            ]),
        ),
        (
            "city",
            texts(&[Some("Paris"), Some("Lyon"), None, Some("Paris"), Some("Nice")]),
        ),
        (
            "income",
            texts(&[Some("1,200"), Some("3,400"), None, Some("1,200"), Some("800")]),
        ),
        (
            "signup",
            texts(&[
                Some("2023-01-15"),
                Some("2022-12-31"),
                Some("not a date"),
                Some("2023-01-15"),
                Some("2021-06-01"),
            ]),
        ),
    ])
}

/// Dataset with `rows` rows, a categorical, a numeric and a text column
pub fn create_large_dataset(rows: usize) -> Dataset {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let categories = ["red", "green", "blue", "amber"];

    let cat = (0..rows)
        .map(|_| Cell::Text(categories[rng.gen_range(0..categories.len())].to_string()))
        .collect();
    let value = (0..rows)
        .map(|_| {
            if rng.gen_bool(0.05) {
                Cell::Null
            } else {
                Cell::Number(rng.gen_range(0.0..1000.0))
            }
        })
        .collect();
    let label = (0..rows)
        .map(|i| Cell::Text(format!("  Item #{}  ", i % 100)))
        .collect();

    Dataset::new(vec![
        Column::new("category", cat),
        Column::new("value", value),
        Column::new("label", label),
    ])
    .unwrap()
}

/// Create a temporary directory holding a file with the given contents
pub fn create_temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}", contents).unwrap();
    (temp_dir, path)
}

/// Rendered text of every cell in a column (`None` for null)
pub fn column_keys(dataset: &Dataset, name: &str) -> Vec<Option<String>> {
    dataset
        .column(name)
        .unwrap_or_else(|| panic!("column '{}' should exist", name))
        .cells
        .iter()
        .map(Cell::key)
        .collect()
}

/// Assert a numeric column matches expected values within tolerance
pub fn assert_numbers_approx(dataset: &Dataset, name: &str, expected: &[Option<f64>]) {
    let cells = &dataset
        .column(name)
        .unwrap_or_else(|| panic!("column '{}' should exist", name))
        .cells;
    assert_eq!(cells.len(), expected.len(), "length mismatch in '{}'", name);
    for (idx, (cell, want)) in cells.iter().zip(expected).enumerate() {
        match (cell, want) {
            (Cell::Null, None) => {}
            (Cell::Number(got), Some(want)) => assert!(
                (got - want).abs() < 1e-9,
                "'{}'[{}]: expected {}, got {}",
                name,
                idx,
                want,
                got
            ),
            (Cell::Int(got), Some(want)) => assert!(
                (*got as f64 - want).abs() < 1e-9,
                "'{}'[{}]: expected {}, got {}",
                name,
                idx,
                want,
                got
            ),
            other => panic!("'{}'[{}]: unexpected pair {:?}", name, idx, other),
        }
    }
}
