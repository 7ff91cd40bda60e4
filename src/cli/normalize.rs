//! `normalize` and `suggestions` commands - pipeline file tooling

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::pipeline::{load_pipeline, parse_suggestions, Step};
use crate::utils::{print_info, print_success, print_warning};

/// Entry point for `clyra normalize`: prints the canonical pipeline JSON
pub fn normalize_command(pipeline: &Path) -> Result<()> {
    let steps = load_pipeline(pipeline)
        .with_context(|| format!("Failed to load pipeline: {}", pipeline.display()))?;
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}

/// Write steps as a canonical pipeline file
pub fn write_pipeline(steps: &[Step], path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(steps)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write pipeline file: {}", path.display()))
}

/// Entry point for `clyra suggestions`
pub fn suggestions_command(file: &Path, output: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read suggestions file: {}", file.display()))?;
    let suggestions = parse_suggestions(&text);

    if suggestions.is_empty() {
        print_warning("No usable suggestions found");
    }

    for (idx, suggestion) in suggestions.iter().enumerate() {
        let title = if suggestion.title.is_empty() {
            suggestion.step.operation.kind()
        } else {
            suggestion.title.as_str()
        };
        println!(
            "    {} {} {}",
            style(format!("{}.", idx + 1)).cyan().bold(),
            style(title).white().bold(),
            style(format!("[{}]", suggestion.step.operation.kind())).dim()
        );
        if !suggestion.description.is_empty() {
            println!("       {}", style(&suggestion.description).dim());
        }
    }

    if let Some(path) = output {
        let steps: Vec<Step> = suggestions.into_iter().map(|s| s.step).collect();
        write_pipeline(&steps, path)?;
        print_success(&format!("Saved {} steps to {}", steps.len(), path.display()));
    } else if !suggestions.is_empty() {
        print_info("Use --output to save these steps as a pipeline file");
    }
    Ok(())
}
