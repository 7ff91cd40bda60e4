//! Pipeline module - step normalization, the operation catalog and execution

pub mod catalog;
pub mod coerce;
pub mod dataset;
pub mod executor;
pub mod loader;
pub mod normalize;
pub mod step;
pub mod suggestions;

pub use dataset::{Cell, Column, Dataset, DatasetError};
pub use executor::{
    apply_step, preview, preview_step, run, run_steps, run_with_report, Preview, RunReport,
    StepOutcome, PREVIEW_ROWS,
};
pub use loader::{
    load_dataset, load_pipeline, parse_pipeline, save_dataset, LoadError, PipelineFileError,
    WriteError,
};
pub use normalize::{canonical_kind, normalize_pipeline, normalize_step};
pub use step::{DatePart, ImputeStrategy, Operation, Step, TargetType, TextCleanFlags};
pub use suggestions::{parse_suggestions, Suggestion};
