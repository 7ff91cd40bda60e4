//! Canonical step model
//!
//! A `Step` is one `Operation` (tagged, with a variant-specific payload) plus
//! whatever extra keys its raw record carried. Dispatch in the catalog matches
//! exhaustively on `Operation`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::normalize::normalize_step;

/// Target type for `change_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Numeric,
    String,
    Boolean,
    Datetime,
}

impl TargetType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Some(Self::Numeric),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "datetime" => Some(Self::Datetime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
        }
    }
}

/// Imputation strategy for missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImputeStrategy {
    Mean,
    Median,
    Mode,
    Custom,
}

impl ImputeStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Some(Self::Mean),
            "median" => Some(Self::Median),
            "mode" => Some(Self::Mode),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Custom => "custom",
        }
    }
}

/// Calendar component extracted by `extract_date_part`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }
}

/// Enabled transforms for `text_clean`. Application order is fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCleanFlags {
    pub trim: bool,
    pub lowercase: bool,
    pub remove_special: bool,
    pub collapse_spaces: bool,
}

/// One transformation with its parameters.
///
/// Missing required parameters are represented as empty strings or `None`;
/// the catalog treats those as no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    DropColumn {
        column: String,
    },
    RenameColumn {
        source: String,
        target: String,
    },
    ChangeType {
        column: String,
        to_type: Option<TargetType>,
    },
    RemoveDuplicateRows {
        subset: Vec<String>,
    },
    Impute {
        column: String,
        strategy: Option<ImputeStrategy>,
        value: Option<Value>,
    },
    ReplaceValues {
        column: String,
        matching: Option<Value>,
        replacement: Option<Value>,
    },
    OneHotEncode {
        column: String,
    },
    LabelEncode {
        column: String,
    },
    ScaleMinMax {
        column: String,
    },
    ScaleStandard {
        column: String,
    },
    ScaleRobust {
        column: String,
    },
    TextClean {
        column: String,
        flags: TextCleanFlags,
    },
    ExtractDatePart {
        column: String,
        part: Option<DatePart>,
    },
    /// Any operation kind the catalog does not know; applied as identity
    Unsupported {
        op: String,
    },
}

impl Operation {
    /// Canonical operation kind name
    pub fn kind(&self) -> &str {
        match self {
            Self::DropColumn { .. } => "drop_column",
            Self::RenameColumn { .. } => "rename_column",
            Self::ChangeType { .. } => "change_type",
            Self::RemoveDuplicateRows { .. } => "remove_duplicate_rows",
            Self::Impute { .. } => "impute",
            Self::ReplaceValues { .. } => "replace_values",
            Self::OneHotEncode { .. } => "one_hot_encode",
            Self::LabelEncode { .. } => "label_encode",
            Self::ScaleMinMax { .. } => "scale_minmax",
            Self::ScaleStandard { .. } => "scale_standard",
            Self::ScaleRobust { .. } => "scale_robust",
            Self::TextClean { .. } => "text_clean",
            Self::ExtractDatePart { .. } => "extract_date_part",
            Self::Unsupported { op } => op,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

/// A normalized pipeline step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: Operation,
    /// Unrecognized keys of the raw record, kept for round-tripping
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            extra: Map::new(),
        }
    }

    /// Normalize any raw wire record. Never fails.
    pub fn from_wire(raw: &Value) -> Self {
        normalize_step(raw)
    }

    /// Canonical wire record: `op`, canonical parameter keys, then extras
    pub fn to_wire(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("op".into(), Value::String(self.operation.kind().to_string()));

        match &self.operation {
            Operation::DropColumn { column }
            | Operation::OneHotEncode { column }
            | Operation::LabelEncode { column }
            | Operation::ScaleMinMax { column }
            | Operation::ScaleStandard { column }
            | Operation::ScaleRobust { column } => put_str(&mut out, "column", column),
            Operation::RenameColumn { source, target } => {
                put_str(&mut out, "from", source);
                put_str(&mut out, "to", target);
            }
            Operation::ChangeType { column, to_type } => {
                put_str(&mut out, "column", column);
                put_str(&mut out, "to_type", to_type.map_or("", |t| t.as_str()));
            }
            Operation::RemoveDuplicateRows { subset } => {
                if !subset.is_empty() {
                    out.insert(
                        "columns".into(),
                        Value::Array(subset.iter().cloned().map(Value::String).collect()),
                    );
                }
            }
            Operation::Impute {
                column,
                strategy,
                value,
            } => {
                put_str(&mut out, "column", column);
                put_str(&mut out, "strategy", strategy.map_or("", |s| s.as_str()));
                if let Some(value) = value {
                    out.insert("value".into(), value.clone());
                }
            }
            Operation::ReplaceValues {
                column,
                matching,
                replacement,
            } => {
                put_str(&mut out, "column", column);
                if let Some(matching) = matching {
                    out.insert("from".into(), matching.clone());
                }
                if let Some(replacement) = replacement {
                    out.insert("to".into(), replacement.clone());
                }
            }
            Operation::TextClean { column, flags } => {
                put_str(&mut out, "column", column);
                out.insert("trim".into(), Value::Bool(flags.trim));
                out.insert("lowercase".into(), Value::Bool(flags.lowercase));
                out.insert("removeSpecial".into(), Value::Bool(flags.remove_special));
                out.insert("collapseSpaces".into(), Value::Bool(flags.collapse_spaces));
            }
            Operation::ExtractDatePart { column, part } => {
                put_str(&mut out, "column", column);
                put_str(&mut out, "part", part.map_or("", |p| p.as_str()));
            }
            Operation::Unsupported { .. } => {}
        }

        for (key, value) in &self.extra {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}

/// Write a string parameter, skipping empty (missing) values
fn put_str(out: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        out.insert(key.into(), Value::String(value.to_string()));
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(normalize_step(&raw))
    }
}
