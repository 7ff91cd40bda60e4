//! Suggested cleaning steps produced by an external text generator
//!
//! The generator is asked for a JSON array of `{title, description, operation}`
//! records. Its output is often wrapped in Markdown fences and occasionally is
//! not an array at all; both cases degrade to fewer suggestions, never an error.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::step::Step;

/// One suggested step with its human-readable rationale
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "operation", alias = "step")]
    pub step: Step,
}

/// Extract the body of the first Markdown code fence (with optional language tag).
///
/// Text before the opening fence and after the closing one is dropped. Text
/// without a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let rest = &trimmed[start + 3..];
    // Drop the language tag line, if any
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Span from the first `[` to the last `]`, for arrays wrapped in prose
fn array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse generator output into suggestions.
///
/// Non-array output yields an empty list. Records that are not objects or lack
/// an `operation` are skipped.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    let body = strip_code_fences(text);
    let parsed = serde_json::from_str::<Value>(body).or_else(|err| match array_span(body) {
        Some(span) => serde_json::from_str(span),
        None => Err(err),
    });
    let items = match parsed {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("Suggestion output is not a JSON array, ignoring");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "Suggestion output is not valid JSON, ignoring");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Suggestion>(item) {
            Ok(suggestion) => Some(suggestion),
            Err(err) => {
                warn!(index, error = %err, "Discarding malformed suggestion");
                None
            }
        })
        .collect()
}
