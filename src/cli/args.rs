//! Command-line argument definitions using clap

use anyhow::bail;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Clyra - Apply JSON cleaning pipelines to tabular datasets
#[derive(Parser, Debug)]
#[command(name = "clyra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000", global = true)]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a pipeline to one or more datasets and write the cleaned results
    Run {
        /// Input file paths (CSV or Parquet). Multiple inputs are cleaned in parallel.
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Pipeline file: a JSON array of steps, or an object with a 'steps' array
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Only valid with a single input. Defaults to '<stem>_cleaned.<ext>' next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview one step on the leading rows of a dataset
    Preview {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Step as inline JSON, or '@path' to read it from a file
        #[arg(short, long)]
        step: String,

        /// Print before/after rows as JSON records instead of tables
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print a pipeline in canonical form
    Normalize {
        /// Pipeline file to normalize
        #[arg(short, long)]
        pipeline: PathBuf,
    },

    /// Parse suggestion generator output into steps
    Suggestions {
        /// File holding the generator's raw text output
        #[arg(short, long)]
        file: PathBuf,

        /// Save the suggested steps as a pipeline file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Derive the default output path for a cleaned dataset.
/// The derived path is in the same directory as the input with a '_cleaned' suffix.
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    parent.join(format!("{}_cleaned.{}", stem, extension))
}

/// Resolve the output path for each input, rejecting `--output` with several inputs
pub fn resolve_outputs(
    inputs: &[PathBuf],
    output: Option<&Path>,
) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
    match output {
        Some(out) if inputs.len() > 1 => bail!(
            "--output '{}' can only be used with a single input ({} given)",
            out.display(),
            inputs.len()
        ),
        Some(out) => Ok(inputs
            .iter()
            .map(|input| (input.clone(), out.to_path_buf()))
            .collect()),
        None => Ok(inputs
            .iter()
            .map(|input| (input.clone(), default_output_path(input)))
            .collect()),
    }
}
