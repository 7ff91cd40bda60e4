//! Clyra: step-based dataset cleaning
//!
//! A library for applying ordered JSON cleaning pipelines to tabular data:
//! step normalization, a catalog of column transformations, previews on the
//! leading rows, and CSV/Parquet I/O.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
