//! CLI module - argument parsing and command handlers

pub mod args;
pub mod normalize;
pub mod preview;
pub mod run;

pub use args::{default_output_path, resolve_outputs, Cli, Commands};
pub use normalize::{normalize_command, suggestions_command, write_pipeline};
pub use preview::{preview_command, read_step_arg};
pub use run::{clean_file, run_command};
