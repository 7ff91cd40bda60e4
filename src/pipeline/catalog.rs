//! Operation catalog - one pure function per transformation
//!
//! Every function takes an owned `Dataset` and returns the next snapshot.
//! None of them fail: an absent column or missing parameter returns the input
//! unchanged, and unparsable values degrade to null.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde_json::Value;

use super::coerce::{self, to_datetime, to_number};
use super::dataset::{Cell, Column, Dataset};
use super::step::{DatePart, ImputeStrategy, Operation, TargetType, TextCleanFlags};

/// Code assigned to null cells by `label_encode`
pub const NULL_LABEL: i64 = -1;

/// Anything that is not a word character, whitespace, or a hyphen
static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-]").expect("valid special-character pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Apply one operation to a snapshot
pub fn apply(dataset: Dataset, operation: &Operation) -> Dataset {
    match operation {
        Operation::DropColumn { column } => drop_column(dataset, column),
        Operation::RenameColumn { source, target } => rename_column(dataset, source, target),
        Operation::ChangeType { column, to_type } => change_type(dataset, column, *to_type),
        Operation::RemoveDuplicateRows { subset } => remove_duplicate_rows(dataset, subset),
        Operation::Impute {
            column,
            strategy,
            value,
        } => impute(dataset, column, *strategy, value.as_ref()),
        Operation::ReplaceValues {
            column,
            matching,
            replacement,
        } => replace_values(dataset, column, matching.as_ref(), replacement.as_ref()),
        Operation::OneHotEncode { column } => one_hot_encode(dataset, column),
        Operation::LabelEncode { column } => label_encode(dataset, column),
        Operation::ScaleMinMax { column } => scale_minmax(dataset, column),
        Operation::ScaleStandard { column } => scale_standard(dataset, column),
        Operation::ScaleRobust { column } => scale_robust(dataset, column),
        Operation::TextClean { column, flags } => text_clean(dataset, column, *flags),
        Operation::ExtractDatePart { column, part } => extract_date_part(dataset, column, *part),
        Operation::Unsupported { .. } => dataset,
    }
}

/// Cells of a referenced column, or `None` when the reference is empty or absent
fn source_cells<'a>(dataset: &'a Dataset, column: &str) -> Option<&'a [Cell]> {
    if column.is_empty() {
        return None;
    }
    dataset.column(column).map(|c| c.cells.as_slice())
}

/// Replace every cell of `column` through `f`
fn map_cells(mut dataset: Dataset, column: &str, f: impl Fn(&Cell) -> Cell) -> Dataset {
    if let Some(col) = dataset.column_mut(column) {
        col.cells = col.cells.iter().map(f).collect();
    }
    dataset
}

pub fn drop_column(mut dataset: Dataset, column: &str) -> Dataset {
    if !column.is_empty() {
        dataset.remove_column(column);
    }
    dataset
}

/// Rename `source` to `target`; an existing column named `target` is overwritten
pub fn rename_column(mut dataset: Dataset, source: &str, target: &str) -> Dataset {
    if source.is_empty() || target.is_empty() {
        return dataset;
    }
    dataset.rename_column(source, target);
    dataset
}

pub fn change_type(dataset: Dataset, column: &str, to_type: Option<TargetType>) -> Dataset {
    let Some(to_type) = to_type else {
        return dataset;
    };
    if source_cells(&dataset, column).is_none() {
        return dataset;
    }
    match to_type {
        TargetType::Numeric => map_cells(dataset, column, |cell| match cell {
            Cell::Int(i) => Cell::Int(*i),
            other => to_number(other).map_or(Cell::Null, Cell::Number),
        }),
        TargetType::String => map_cells(dataset, column, |cell| match cell {
            Cell::Null => Cell::Null,
            other => Cell::Text(other.to_string()),
        }),
        TargetType::Boolean => map_cells(dataset, column, |cell| {
            let text = cell.to_string().to_lowercase();
            Cell::Bool(matches!(text.as_str(), "1" | "true" | "yes"))
        }),
        TargetType::Datetime => map_cells(dataset, column, |cell| {
            to_datetime(cell).map_or(Cell::Null, Cell::DateTime)
        }),
    }
}

/// Drop rows that repeat an earlier row, comparing `subset` (or every column when empty)
pub fn remove_duplicate_rows(mut dataset: Dataset, subset: &[String]) -> Dataset {
    let indices: Vec<usize> = if subset.is_empty() {
        (0..dataset.width()).collect()
    } else {
        match subset
            .iter()
            .map(|name| dataset.position(name))
            .collect::<Option<Vec<usize>>>()
        {
            Some(indices) => indices,
            None => return dataset,
        }
    };

    let columns = dataset.columns();
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
    let keep: Vec<bool> = (0..dataset.height())
        .map(|row| {
            let key = indices.iter().map(|&i| columns[i].cells[row].key()).collect();
            seen.insert(key)
        })
        .collect();

    if keep.iter().all(|&k| k) {
        return dataset;
    }
    dataset.retain_rows(&keep);
    dataset
}

/// Most frequent non-null cell; ties go to the value encountered first
fn mode(cells: &[Cell]) -> Option<Cell> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        if let Some(key) = cell.key() {
            counts.entry(key).or_insert((0, idx)).0 += 1;
        }
    }
    counts
        .into_values()
        .max_by(|(count_a, first_a), (count_b, first_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(_, first)| cells[first].clone())
}

/// Fill nulls in `column` using `strategy`
pub fn impute(
    dataset: Dataset,
    column: &str,
    strategy: Option<ImputeStrategy>,
    value: Option<&Value>,
) -> Dataset {
    let (Some(cells), Some(strategy)) = (source_cells(&dataset, column), strategy) else {
        return dataset;
    };

    let fill = match strategy {
        ImputeStrategy::Mean => coerce::mean(&coerce::numeric_view(cells)).map(Cell::from_f64),
        ImputeStrategy::Median => {
            coerce::median(&coerce::numeric_view(cells)).map(Cell::from_f64)
        }
        ImputeStrategy::Mode => mode(cells),
        ImputeStrategy::Custom => value.map(Cell::from_json),
    };

    match fill {
        Some(fill) if !fill.is_null() => map_cells(dataset, column, |cell| {
            if cell.is_null() {
                fill.clone()
            } else {
                cell.clone()
            }
        }),
        _ => dataset,
    }
}

/// Substitute every cell equal to `matching` with `replacement`
pub fn replace_values(
    dataset: Dataset,
    column: &str,
    matching: Option<&Value>,
    replacement: Option<&Value>,
) -> Dataset {
    let (Some(matching), Some(replacement)) = (matching, replacement) else {
        return dataset;
    };
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };

    let target_key = Cell::from_json(matching).key();
    if !cells.iter().any(|c| c.key() == target_key) {
        return dataset;
    }
    let replacement = Cell::from_json(replacement);
    map_cells(dataset, column, |cell| {
        if cell.key() == target_key {
            replacement.clone()
        } else {
            cell.clone()
        }
    })
}

/// Distinct non-null keys in first-encounter order
fn categories(keys: &[Option<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.iter()
        .flatten()
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// Replace `column` with one boolean indicator column per distinct value
pub fn one_hot_encode(mut dataset: Dataset, column: &str) -> Dataset {
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let keys: Vec<Option<String>> = cells.iter().map(Cell::key).collect();
    let categories = categories(&keys);

    dataset.remove_column(column);
    for category in &categories {
        let indicator = keys
            .iter()
            .map(|key| Cell::Bool(key.as_deref() == Some(category.as_str())))
            .collect();
        dataset.set_column(Column::new(format!("{column}_{category}"), indicator));
    }
    dataset
}

/// Add `<column>_label` with integer codes in first-encounter order
pub fn label_encode(mut dataset: Dataset, column: &str) -> Dataset {
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let keys: Vec<Option<String>> = cells.iter().map(Cell::key).collect();
    let codes: HashMap<String, i64> = categories(&keys).into_iter().zip(0..).collect();
    let labels = keys
        .iter()
        .map(|key| {
            let code = key.as_ref().and_then(|k| codes.get(k)).copied();
            Cell::Int(code.unwrap_or(NULL_LABEL))
        })
        .collect();
    dataset.set_column(Column::new(format!("{column}_label"), labels));
    dataset
}

fn derive_numeric(
    mut dataset: Dataset,
    name: String,
    view: &[Option<f64>],
    f: impl Fn(f64) -> f64,
) -> Dataset {
    let cells = view
        .iter()
        .map(|v| v.map_or(Cell::Null, |x| Cell::from_f64(f(x))))
        .collect();
    dataset.set_column(Column::new(name, cells));
    dataset
}

fn all_null(mut dataset: Dataset, name: String) -> Dataset {
    let cells = vec![Cell::Null; dataset.height()];
    dataset.set_column(Column::new(name, cells));
    dataset
}

/// Add `<column>_minmax`; a constant or empty column yields all nulls
pub fn scale_minmax(dataset: Dataset, column: &str) -> Dataset {
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let view = coerce::numeric_view(cells);
    let name = format!("{column}_minmax");
    match (coerce::min(&view), coerce::max(&view)) {
        (Some(lo), Some(hi)) if hi > lo => {
            derive_numeric(dataset, name, &view, |x| (x - lo) / (hi - lo))
        }
        _ => all_null(dataset, name),
    }
}

/// Add `<column>_std` (z-score with sample standard deviation)
pub fn scale_standard(dataset: Dataset, column: &str) -> Dataset {
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let view = coerce::numeric_view(cells);
    let name = format!("{column}_std");
    match (coerce::mean(&view), coerce::sample_std(&view)) {
        (Some(mean), Some(std)) => {
            let divisor = if std == 0.0 { 1.0 } else { std };
            derive_numeric(dataset, name, &view, |x| (x - mean) / divisor)
        }
        _ => all_null(dataset, name),
    }
}

/// Add `<column>_robust`, centered on the median and scaled by the interquartile range
pub fn scale_robust(dataset: Dataset, column: &str) -> Dataset {
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let view = coerce::numeric_view(cells);
    let name = format!("{column}_robust");
    let stats = (
        coerce::median(&view),
        coerce::quantile(&view, 0.25),
        coerce::quantile(&view, 0.75),
    );
    match stats {
        (Some(median), Some(q1), Some(q3)) => {
            let iqr = q3 - q1;
            let divisor = if iqr == 0.0 { 1.0 } else { iqr };
            derive_numeric(dataset, name, &view, |x| (x - median) / divisor)
        }
        _ => all_null(dataset, name),
    }
}

/// Clean one string; transforms always run in the order trim, lowercase, strip, collapse
pub fn clean_text(text: &str, flags: TextCleanFlags) -> String {
    let mut out = text.to_string();
    if flags.trim {
        out = out.trim().to_string();
    }
    if flags.lowercase {
        out = out.to_lowercase();
    }
    if flags.remove_special {
        out = SPECIAL_CHARS.replace_all(&out, "").into_owned();
    }
    if flags.collapse_spaces {
        out = WHITESPACE_RUN.replace_all(&out, " ").into_owned();
    }
    out
}

pub fn text_clean(dataset: Dataset, column: &str, flags: TextCleanFlags) -> Dataset {
    if source_cells(&dataset, column).is_none() {
        return dataset;
    }
    map_cells(dataset, column, |cell| match cell {
        Cell::Null => Cell::Null,
        other => Cell::Text(clean_text(&other.to_string(), flags)),
    })
}

/// Add `<column>_<part>` holding the year, month, or day of each parsable date
pub fn extract_date_part(mut dataset: Dataset, column: &str, part: Option<DatePart>) -> Dataset {
    let Some(part) = part else {
        return dataset;
    };
    let Some(cells) = source_cells(&dataset, column) else {
        return dataset;
    };
    let values = cells
        .iter()
        .map(|cell| match to_datetime(cell) {
            Some(dt) => Cell::Int(match part {
                DatePart::Year => i64::from(dt.year()),
                DatePart::Month => i64::from(dt.month()),
                DatePart::Day => i64::from(dt.day()),
            }),
            None => Cell::Null,
        })
        .collect();
    dataset.set_column(Column::new(format!("{column}_{}", part.as_str()), values));
    dataset
}
