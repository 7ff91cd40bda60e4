//! Run summary report generation

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::RunReport;

/// Summary of one pipeline run over one input file
#[derive(Debug)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: RunReport,
}

impl RunSummary {
    pub fn new(input: PathBuf, output: PathBuf, report: RunReport) -> Self {
        Self {
            input,
            output,
            report,
        }
    }

    /// Shape overview: rows, columns and steps applied
    pub fn overview_table(&self) -> Table {
        let report = &self.report;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Before").add_attribute(Attribute::Bold),
            Cell::new("After").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("Rows"),
            Cell::new(report.rows_before),
            Cell::new(report.rows_after).fg(change_color(report.rows_before, report.rows_after)),
        ]);
        table.add_row(vec![
            Cell::new("Columns"),
            Cell::new(report.columns_before),
            Cell::new(report.columns_after)
                .fg(change_color(report.columns_before, report.columns_after)),
        ]);

        let skipped = report.unsupported().len();
        table.add_row(vec![
            Cell::new("Steps applied"),
            Cell::new(report.steps.len()),
            Cell::new(report.steps_applied())
                .fg(if skipped == 0 { Color::Green } else { Color::Yellow })
                .add_attribute(Attribute::Bold),
        ]);
        table
    }

    /// One row per step with its shape change
    pub fn steps_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Operation").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Columns").add_attribute(Attribute::Bold),
        ]);

        for step in &self.report.steps {
            let op = if step.supported {
                Cell::new(&step.kind)
            } else {
                Cell::new(format!("{} (skipped)", step.kind)).fg(Color::Yellow)
            };
            table.add_row(vec![
                Cell::new(step.index + 1),
                op,
                Cell::new(format!("{} → {}", step.rows_before, step.rows_after)),
                Cell::new(format!("{} → {}", step.columns_before, step.columns_after)),
            ]);
        }
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!("      Input:  {}", self.input.display());
        println!("      Output: {}", self.output.display());
        println!(
            "      Time:   {}",
            style(format!("{:.2}s", self.report.duration.as_secs_f64())).dim()
        );
        println!();

        print_indented(&self.overview_table());

        if !self.report.steps.is_empty() {
            println!();
            print_indented(&self.steps_table());
        }

        let unsupported = self.report.unsupported();
        if !unsupported.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Skipped unsupported operations").yellow(),
                style(format!("({})", unsupported.len())).dim()
            );
            for kind in unsupported {
                let label = if kind.is_empty() { "<missing op>" } else { kind };
                println!("        {} {}", style("•").dim(), label);
            }
        }
    }
}

fn change_color(before: usize, after: usize) -> Color {
    match after.cmp(&before) {
        std::cmp::Ordering::Less => Color::Red,
        std::cmp::Ordering::Greater => Color::Cyan,
        std::cmp::Ordering::Equal => Color::White,
    }
}

/// Print a table indented to line up with the other report output
pub fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
