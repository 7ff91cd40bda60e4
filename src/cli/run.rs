//! `run` command - apply a pipeline file to one or more datasets

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

use super::args::resolve_outputs;
use crate::pipeline::{load_dataset, load_pipeline, run_with_report, save_dataset, Step};
use crate::report::RunSummary;
use crate::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_run_config, print_warning,
};

/// Load one dataset, apply the steps and write the result
pub fn clean_file(
    input: &Path,
    output: &Path,
    steps: &[Step],
    infer_schema_length: usize,
) -> Result<RunSummary> {
    let dataset = load_dataset(input, infer_schema_length)
        .with_context(|| format!("Failed to load dataset: {}", input.display()))?;

    let (cleaned, report) = run_with_report(&dataset, steps);
    drop(dataset);

    save_dataset(&cleaned, output)
        .with_context(|| format!("Failed to write cleaned dataset: {}", output.display()))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = cleaned.height(),
        columns = cleaned.width(),
        "Wrote cleaned dataset"
    );

    Ok(RunSummary::new(
        input.to_path_buf(),
        output.to_path_buf(),
        report,
    ))
}

/// Entry point for `clyra run`
pub fn run_command(
    inputs: &[PathBuf],
    pipeline: &Path,
    output: Option<&Path>,
    infer_schema_length: usize,
) -> Result<()> {
    let jobs = resolve_outputs(inputs, output)?;
    let steps = load_pipeline(pipeline)
        .with_context(|| format!("Failed to load pipeline: {}", pipeline.display()))?;

    print_banner(env!("CARGO_PKG_VERSION"));
    if let [(input, output)] = jobs.as_slice() {
        print_run_config(input, pipeline, output, steps.len());
    }

    let spinner = create_spinner(&format!(
        "Cleaning {} file{}...",
        jobs.len(),
        if jobs.len() == 1 { "" } else { "s" }
    ));

    // Each job owns its snapshots; only the steps are shared
    let results: Vec<(PathBuf, Result<RunSummary>)> = jobs
        .par_iter()
        .map(|(input, output)| {
            (
                input.clone(),
                clean_file(input, output, &steps, infer_schema_length),
            )
        })
        .collect();

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();
    if failures == 0 {
        finish_with_success(&spinner, "Pipeline applied");
    } else {
        finish_with_error(&spinner, &format!("{} of {} files failed", failures, jobs.len()));
    }

    let mut first_error = None;
    for (input, result) in results {
        match result {
            Ok(summary) => summary.display(),
            Err(err) => {
                print_warning(&format!("{}: {:#}", input.display(), err));
                first_error.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_error {
        if jobs.len() == 1 {
            return Err(err);
        }
        anyhow::bail!("{} of {} files failed to clean", failures, jobs.len());
    }

    print_completion(jobs.len());
    Ok(())
}
