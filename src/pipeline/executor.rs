//! Pipeline executor - normalizes raw steps and applies them in order
//!
//! Every step receives an owned snapshot and returns the next one, so the
//! caller's dataset is never mutated and intermediate snapshots are dropped as
//! soon as they are superseded.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::catalog;
use super::dataset::Dataset;
use super::normalize::{normalize_pipeline, normalize_step};
use super::step::Step;

/// Number of leading rows a preview operates on
pub const PREVIEW_ROWS: usize = 50;

/// Before/after view of a single step over the leading rows
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub step: Step,
    pub before: Dataset,
    pub after: Dataset,
}

/// Shape change caused by one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Zero-based position in the pipeline
    pub index: usize,
    /// Canonical operation kind, or the raw kind when unsupported
    pub kind: String,
    pub supported: bool,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

/// Report generated after a full run. Holds counts only, never snapshots.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
    pub steps: Vec<StepOutcome>,
    pub duration: Duration,
}

impl RunReport {
    /// Kinds of the steps that were skipped as unsupported
    pub fn unsupported(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.supported)
            .map(|s| s.kind.as_str())
            .collect()
    }

    pub fn steps_applied(&self) -> usize {
        self.steps.iter().filter(|s| s.supported).count()
    }
}

/// Apply one normalized step to a snapshot
pub fn apply_step(dataset: Dataset, step: &Step) -> Dataset {
    if !step.operation.is_supported() {
        warn!(op = step.operation.kind(), "Unsupported operation, passing dataset through");
    }
    catalog::apply(dataset, &step.operation)
}

/// Normalize and apply one raw step to the first `PREVIEW_ROWS` rows
pub fn preview(dataset: &Dataset, raw_step: &Value) -> Preview {
    preview_step(dataset, normalize_step(raw_step))
}

/// Apply a normalized step to the first `PREVIEW_ROWS` rows
pub fn preview_step(dataset: &Dataset, step: Step) -> Preview {
    let before = dataset.head(PREVIEW_ROWS);
    let after = apply_step(before.clone(), &step);
    debug!(
        op = step.operation.kind(),
        rows = before.height(),
        "Previewed step"
    );
    Preview {
        step,
        before,
        after,
    }
}

/// Normalize and apply a raw pipeline to the full dataset, returning the final snapshot
pub fn run(dataset: &Dataset, raw_pipeline: &[Value]) -> Dataset {
    run_steps(dataset, &normalize_pipeline(raw_pipeline))
}

/// Apply normalized steps in order to the full dataset
pub fn run_steps(dataset: &Dataset, steps: &[Step]) -> Dataset {
    run_with_report(dataset, steps).0
}

/// Apply normalized steps in order, also reporting each step's shape change
pub fn run_with_report(dataset: &Dataset, steps: &[Step]) -> (Dataset, RunReport) {
    let start = Instant::now();
    let (rows_before, columns_before) = dataset.shape();
    let mut outcomes = Vec::with_capacity(steps.len());

    let mut snapshot = dataset.clone();
    for (index, step) in steps.iter().enumerate() {
        let (rows, columns) = snapshot.shape();
        snapshot = apply_step(snapshot, step);
        let outcome = StepOutcome {
            index,
            kind: step.operation.kind().to_string(),
            supported: step.operation.is_supported(),
            rows_before: rows,
            rows_after: snapshot.height(),
            columns_before: columns,
            columns_after: snapshot.width(),
        };
        debug!(
            step = index + 1,
            op = %outcome.kind,
            rows = outcome.rows_after,
            columns = outcome.columns_after,
            "Applied step"
        );
        outcomes.push(outcome);
    }

    let report = RunReport {
        rows_before,
        columns_before,
        rows_after: snapshot.height(),
        columns_after: snapshot.width(),
        steps: outcomes,
        duration: start.elapsed(),
    };
    info!(
        steps = steps.len(),
        rows = report.rows_after,
        columns = report.columns_after,
        "Pipeline run complete"
    );
    (snapshot, report)
}
