//! Reply parsing: model text → [`StructuredResult`].
//!
//! Models asked for "only JSON" still sometimes wrap it in a ```json fence
//! or prefix a byte-order mark. Those wrappers are removed; anything else
//! that is not a JSON object with the expected fields is an error. The
//! result is all-or-nothing: a reply missing `practiceProblems` never
//! becomes a half-filled worksheet.

use crate::error::InferenceError;
use crate::output::StructuredResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?[ \t]*\r?\n(.*)\r?\n```\s*$").unwrap());

/// Parse the model's reply text.
pub fn parse_reply(text: &str) -> Result<StructuredResult, InferenceError> {
    let trimmed = text.trim_start_matches('\u{FEFF}').trim();
    if trimmed.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    let body = strip_json_fences(trimmed);
    let mut value: Value =
        serde_json::from_str(body).map_err(|e| InferenceError::NotJson {
            detail: e.to_string(),
        })?;

    let obj = value
        .as_object_mut()
        .ok_or_else(|| InferenceError::SchemaMismatch {
            detail: format!("expected a JSON object, got {}", json_kind(body)),
        })?;

    // Treat `"answerKey": null` like an omitted key.
    if obj.get("answerKey").is_some_and(Value::is_null) {
        obj.remove("answerKey");
    }

    serde_json::from_value(value).map_err(|e| InferenceError::SchemaMismatch {
        detail: e.to_string(),
    })
}

fn strip_json_fences(input: &str) -> &str {
    match RE_OUTER_FENCES.captures(input) {
        Some(caps) => caps.get(1).map_or(input, |m| m.as_str()),
        None => input,
    }
}

fn json_kind(body: &str) -> &'static str {
    match body.chars().next() {
        Some('[') => "an array",
        Some('"') => "a string",
        _ => "a scalar",
    }
}
