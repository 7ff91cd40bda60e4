//! `preview` command - show one step's effect on the leading rows

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::pipeline::{load_dataset, preview};
use crate::report::display_preview;
use crate::utils::create_spinner;

/// Parse a step argument: inline JSON, or `@path` to a JSON file
pub fn read_step_arg(arg: &str) -> Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read step file: {}", path))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("Step is not valid JSON")
}

/// Entry point for `clyra preview`
pub fn preview_command(
    input: &Path,
    step_arg: &str,
    as_json: bool,
    infer_schema_length: usize,
) -> Result<()> {
    let raw_step = read_step_arg(step_arg)?;

    let spinner = create_spinner("Loading dataset...");
    let dataset = load_dataset(input, infer_schema_length)
        .with_context(|| format!("Failed to load dataset: {}", input.display()))?;
    spinner.finish_and_clear();

    let result = preview(&dataset, &raw_step);

    if as_json {
        let out = json!({
            "step": result.step,
            "before": result.before.to_records(),
            "after": result.after.to_records(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        display_preview(&result);
    }
    Ok(())
}
