//! Step normalizer - maps heterogeneous raw step records to canonical `Step`s
//!
//! Raw records come from several producers that disagree on key names
//! (`from` vs `from_col`, `to_type` vs `toType`, `one_hot` vs `one_hot_encode`).
//! Every synonym group is resolved here, once, by priority.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::step::{DatePart, ImputeStrategy, Operation, Step, TargetType, TextCleanFlags};

const RENAME_SOURCE_KEYS: [&str; 4] = ["from", "from_", "from_col", "column"];
const RENAME_TARGET_KEYS: [&str; 2] = ["to", "to_value"];
const MATCH_KEYS: [&str; 2] = ["from", "from_value"];
const REPLACEMENT_KEYS: [&str; 2] = ["to", "to_value"];
const TYPE_KEYS: [&str; 2] = ["to_type", "toType"];
const SUBSET_KEYS: [&str; 5] = ["columns", "byColumns", "by", "by_cols", "subset"];

/// Raw record plus the set of keys consumed so far.
///
/// Keys never consumed end up in `Step::extra`.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    used: BTreeSet<&'static str>,
}

impl<'a> Fields<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            used: BTreeSet::new(),
        }
    }

    /// First key in `keys` holding a non-null value. All keys are marked consumed.
    fn first(&mut self, keys: &[&'static str]) -> Option<&'a Value> {
        self.used.extend(keys.iter().copied());
        let map = self.map;
        keys.iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
    }

    /// Like `first`, but an explicit `null` counts as a literal when nothing better exists
    fn literal(&mut self, keys: &[&'static str]) -> Option<Value> {
        if let Some(value) = self.first(keys) {
            return Some(value.clone());
        }
        keys.iter()
            .any(|k| self.map.contains_key(*k))
            .then_some(Value::Null)
    }

    /// String parameter; numbers are read as their decimal text, anything else is missing
    fn string(&mut self, keys: &[&'static str]) -> String {
        self.first(keys).map(scalar_text).unwrap_or_default()
    }

    fn column(&mut self) -> String {
        self.string(&["column"])
    }

    fn flag(&mut self, keys: &[&'static str]) -> bool {
        self.first(keys).is_some_and(truthy)
    }

    fn string_list(&mut self, keys: &[&'static str]) -> Vec<String> {
        match self.first(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(single) => {
                let text = scalar_text(single);
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
            None => Vec::new(),
        }
    }

    fn into_extra(self) -> Map<String, Value> {
        self.map
            .iter()
            .filter(|(k, _)| k.as_str() != "op" && !self.used.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Map an operation kind (including legacy synonyms) to its canonical name
pub fn canonical_kind(op: &str) -> Option<&'static str> {
    let kind = match op.trim() {
        "drop_column" => "drop_column",
        "rename_column" => "rename_column",
        "change_type" => "change_type",
        "remove_duplicate_rows" | "remove_duplicates" => "remove_duplicate_rows",
        "impute" => "impute",
        "replace_values" => "replace_values",
        "one_hot_encode" | "one_hot" => "one_hot_encode",
        "label_encode" => "label_encode",
        "scale_minmax" => "scale_minmax",
        "scale_standard" => "scale_standard",
        "scale_robust" => "scale_robust",
        "text_clean" => "text_clean",
        "extract_date_part" | "extract_date" => "extract_date_part",
        _ => return None,
    };
    Some(kind)
}

/// Normalize one raw step record. Never fails.
pub fn normalize_step(raw: &Value) -> Step {
    let empty = Map::new();
    let map = raw.as_object().unwrap_or(&empty);
    let op = map.get("op").and_then(Value::as_str).unwrap_or_default();

    let mut fields = Fields::new(map);
    let operation = match canonical_kind(op) {
        Some("drop_column") => Operation::DropColumn {
            column: fields.column(),
        },
        Some("rename_column") => Operation::RenameColumn {
            source: fields.string(&RENAME_SOURCE_KEYS),
            target: fields.string(&RENAME_TARGET_KEYS),
        },
        Some("change_type") => Operation::ChangeType {
            column: fields.column(),
            to_type: TargetType::parse(&fields.string(&TYPE_KEYS)),
        },
        Some("remove_duplicate_rows") => Operation::RemoveDuplicateRows {
            subset: fields.string_list(&SUBSET_KEYS),
        },
        Some("impute") => Operation::Impute {
            column: fields.column(),
            strategy: ImputeStrategy::parse(&fields.string(&["strategy"])),
            value: fields.first(&["value"]).cloned(),
        },
        Some("replace_values") => Operation::ReplaceValues {
            column: fields.column(),
            matching: fields.literal(&MATCH_KEYS),
            replacement: fields.literal(&REPLACEMENT_KEYS),
        },
        Some("one_hot_encode") => Operation::OneHotEncode {
            column: fields.column(),
        },
        Some("label_encode") => Operation::LabelEncode {
            column: fields.column(),
        },
        Some("scale_minmax") => Operation::ScaleMinMax {
            column: fields.column(),
        },
        Some("scale_standard") => Operation::ScaleStandard {
            column: fields.column(),
        },
        Some("scale_robust") => Operation::ScaleRobust {
            column: fields.column(),
        },
        Some("text_clean") => Operation::TextClean {
            column: fields.column(),
            flags: TextCleanFlags {
                trim: fields.flag(&["trim"]),
                lowercase: fields.flag(&["lowercase"]),
                remove_special: fields.flag(&["removeSpecial", "remove_special"]),
                collapse_spaces: fields.flag(&["collapseSpaces", "collapse_spaces"]),
            },
        },
        Some("extract_date_part") => Operation::ExtractDatePart {
            column: fields.column(),
            part: DatePart::parse(&fields.string(&["part"])),
        },
        _ => Operation::Unsupported { op: op.to_string() },
    };

    Step {
        operation,
        extra: fields.into_extra(),
    }
}

/// Normalize a sequence of raw step records
pub fn normalize_pipeline(raw: &[Value]) -> Vec<Step> {
    raw.iter().map(normalize_step).collect()
}
