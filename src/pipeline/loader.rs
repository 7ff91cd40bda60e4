//! Dataset and pipeline file I/O
//!
//! Datasets are read and written through polars (CSV or Parquet based on
//! extension) and converted to and from the loosely typed `Dataset` the
//! catalog works on. Pipelines are JSON files of raw step records.

use std::path::Path;

use polars::prelude::*;
use serde_json::Value;
use thiserror::Error;

use super::coerce::parse_datetime;
use super::dataset::{Cell, Column as DatasetColumn, Dataset, DatasetError};
use super::normalize::normalize_pipeline;
use super::step::Step;

/// Failure to produce a well-formed dataset from a source file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file format: '{0}'. Supported formats: csv, parquet")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Polars {
        path: String,
        #[source]
        source: PolarsError,
    },

    #[error("Malformed dataset in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: DatasetError,
    },
}

/// Failure to persist a dataset
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Unsupported output format: '{0}'. Supported formats: csv, parquet")]
    UnsupportedFormat(String),

    #[error("Failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Polars {
        path: String,
        #[source]
        source: PolarsError,
    },
}

/// Failure to read a pipeline or step file
#[derive(Debug, Error)]
pub enum PipelineFileError {
    #[error("Failed to read pipeline file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pipeline must be a JSON array of steps or an object with a 'steps' array")]
    NotASequence,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a CSV or Parquet file into a polars DataFrame
pub fn read_frame(path: &Path, infer_schema_length: usize) -> Result<DataFrame, LoadError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(LoadError::Io {
            path: display,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    // 0 means full scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension_of(path).as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .with_try_parse_dates(true)
            .finish(),
        "parquet" => LazyFrame::scan_parquet(path, Default::default()),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    lf.and_then(|lf| lf.collect())
        .map_err(|source| LoadError::Polars {
            path: display,
            source,
        })
}

/// Convert one polars series into dataset cells
fn series_to_cells(series: &Series) -> PolarsResult<Vec<Cell>> {
    let dtype = series.dtype().clone();
    let cells = if dtype == DataType::Boolean {
        series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Bool))
            .collect()
    } else if dtype.is_integer() {
        let cast = series.cast(&DataType::Int64)?;
        cast.i64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Int))
            .collect()
    } else if dtype.is_float() {
        let cast = series.cast(&DataType::Float64)?;
        cast.f64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::from_f64))
            .collect()
    } else {
        let cast = series.cast(&DataType::String)?;
        // Time and Duration have no calendar date and stay as their text
        let temporal = matches!(dtype, DataType::Date | DataType::Datetime(_, _));
        cast.str()?
            .into_iter()
            .map(|v| match v {
                None => Cell::Null,
                Some(s) if temporal => parse_datetime(s).map_or(Cell::Null, Cell::DateTime),
                Some(s) => Cell::Text(s.to_string()),
            })
            .collect()
    };
    Ok(cells)
}

/// Convert a polars DataFrame into a `Dataset`
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset, LoadError> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let cells = series_to_cells(column.as_materialized_series()).map_err(|source| {
            LoadError::Polars {
                path: column.name().to_string(),
                source,
            }
        })?;
        columns.push(DatasetColumn::new(column.name().to_string(), cells));
    }
    Dataset::new(columns).map_err(|source| LoadError::Malformed {
        path: "<frame>".to_string(),
        source,
    })
}

/// Load a dataset from a CSV or Parquet file
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<Dataset, LoadError> {
    let df = read_frame(path, infer_schema_length)?;
    dataset_from_frame(&df).map_err(|err| match err {
        LoadError::Malformed { source, .. } => LoadError::Malformed {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Column representation chosen for writing
fn column_to_polars(column: &DatasetColumn) -> polars::prelude::Column {
    let name: PlSmallStr = column.name.as_str().into();
    let present = || column.cells.iter().filter(|c| !c.is_null());

    if present().all(|c| matches!(c, Cell::Int(_))) {
        let values: Vec<Option<i64>> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        polars::prelude::Column::new(name, values)
    } else if present().all(|c| matches!(c, Cell::Int(_) | Cell::Number(_))) {
        let values: Vec<Option<f64>> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Int(i) => Some(*i as f64),
                Cell::Number(f) => Some(*f),
                _ => None,
            })
            .collect();
        polars::prelude::Column::new(name, values)
    } else if present().all(|c| matches!(c, Cell::Bool(_))) {
        let values: Vec<Option<bool>> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        polars::prelude::Column::new(name, values)
    } else {
        let values: Vec<Option<String>> = column.cells.iter().map(Cell::key).collect();
        polars::prelude::Column::new(name, values)
    }
}

/// Convert a `Dataset` into a polars DataFrame
pub fn dataset_to_frame(dataset: &Dataset) -> PolarsResult<DataFrame> {
    DataFrame::new(dataset.columns().iter().map(column_to_polars).collect())
}

/// Save a dataset as CSV or Parquet based on the path's extension
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), WriteError> {
    let display = path.display().to_string();
    let polars_err = |source: PolarsError| WriteError::Polars {
        path: display.clone(),
        source,
    };

    let extension = extension_of(path);
    if extension != "csv" && extension != "parquet" {
        return Err(WriteError::UnsupportedFormat(extension));
    }

    let mut df = dataset_to_frame(dataset).map_err(polars_err)?;
    let mut file = std::fs::File::create(path).map_err(|source| WriteError::Io {
        path: display.clone(),
        source,
    })?;

    if extension == "csv" {
        CsvWriter::new(&mut file).finish(&mut df).map_err(polars_err)?;
    } else {
        ParquetWriter::new(file).finish(&mut df).map_err(polars_err)?;
    }
    Ok(())
}

/// Parse pipeline JSON: an array of step records, or an object with a `steps`/`pipeline` array
pub fn parse_pipeline(text: &str) -> Result<Vec<Step>, PipelineFileError> {
    let value: Value = serde_json::from_str(text)?;
    let raw = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("steps").or_else(|| map.get("pipeline")) {
            Some(Value::Array(items)) => items,
            _ => return Err(PipelineFileError::NotASequence),
        },
        _ => return Err(PipelineFileError::NotASequence),
    };
    Ok(normalize_pipeline(raw))
}

/// Read and normalize a pipeline file
pub fn load_pipeline(path: &Path) -> Result<Vec<Step>, PipelineFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| PipelineFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_pipeline(&text)
}
