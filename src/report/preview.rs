//! Before/after tables for single-step previews

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell as TableCell, Color, Table};
use console::style;

use super::summary::print_indented;
use crate::pipeline::{Cell, Dataset, Preview};

/// Rows shown per table in the terminal; the preview itself may hold more
pub const DISPLAY_ROWS: usize = 10;

/// Render the first `max_rows` rows of a dataset as a table
pub fn dataset_table(dataset: &Dataset, max_rows: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        dataset
            .column_names()
            .into_iter()
            .map(|name| TableCell::new(name).add_attribute(Attribute::Bold)),
    );

    for idx in 0..dataset.height().min(max_rows) {
        table.add_row(dataset.row(idx).into_iter().map(|cell| match cell {
            Cell::Null => TableCell::new("null").fg(Color::DarkGrey),
            other => TableCell::new(other.to_string()),
        }));
    }
    table
}

/// Print a preview as two tables with shape headers
pub fn display_preview(preview: &Preview) {
    let kind = preview.step.operation.kind();
    println!();
    println!(
        "    {} {}",
        style("🔍").cyan(),
        style(format!(
            "PREVIEW {}",
            if kind.is_empty() { "<missing op>" } else { kind }
        ))
        .white()
        .bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    if !preview.step.operation.is_supported() {
        println!(
            "      {}",
            style("Unsupported operation, dataset passes through unchanged").yellow()
        );
    }

    for (label, dataset) in [("Before", &preview.before), ("After", &preview.after)] {
        let (rows, columns) = dataset.shape();
        println!();
        println!(
            "      {} {}",
            style(label).cyan().bold(),
            style(format!("({} rows × {} columns)", rows, columns)).dim()
        );
        print_indented(&dataset_table(dataset, DISPLAY_ROWS));
        if rows > DISPLAY_ROWS {
            println!(
                "      {}",
                style(format!("… {} more rows", rows - DISPLAY_ROWS)).dim()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Column;

    #[test]
    fn test_dataset_table_truncates_rows() {
        let dataset = Dataset::new(vec![Column::new(
            "n",
            (0..25).map(Cell::Int).collect(),
        )])
        .unwrap();
        let rendered = dataset_table(&dataset, 3).to_string();
        assert!(rendered.contains('n'));
        assert!(rendered.contains('2'));
        assert!(!rendered.contains("24"));
    }

    #[test]
    fn test_dataset_table_renders_null() {
        let dataset = Dataset::new(vec![Column::new("a", vec![Cell::Null])]).unwrap();
        assert!(dataset_table(&dataset, 5).to_string().contains("null"));
    }
}
