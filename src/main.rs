//! Clyra: step-based dataset cleaning CLI
//!
//! Applies JSON cleaning pipelines to CSV and Parquet files, previews single
//! steps and normalizes pipeline files.

use anyhow::Result;
use clap::Parser;

use clyra::cli::{
    normalize_command, preview_command, run_command, suggestions_command, Cli, Commands,
};
use clyra::utils::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run {
            input,
            pipeline,
            output,
        } => run_command(input, pipeline, output.as_deref(), cli.infer_schema_length),
        Commands::Preview { input, step, json } => {
            preview_command(input, step, *json, cli.infer_schema_length)
        }
        Commands::Normalize { pipeline } => normalize_command(pipeline),
        Commands::Suggestions { file, output } => suggestions_command(file, output.as_deref()),
    }
}
