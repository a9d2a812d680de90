//! Helpers for turning free-form model output into usable values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\n?").expect("valid code fence regex"));

/// First integer in a text, optionally grouped with `.` or `,` thousands separators.
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:[.,]\d{3})+|\d+").expect("valid number regex"));

/// Model output after fence stripping.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Json(Value),
    /// Not JSON; holds the cleaned text for heuristic fallbacks.
    Raw(String),
}

/// Strip Markdown code fences and parse the remainder as JSON.
pub fn parse_ai_response(raw: &str) -> ParsedResponse {
    let clean = CODE_FENCE.replace_all(raw, "").trim().to_string();
    match serde_json::from_str::<Value>(&clean) {
        Ok(value) => ParsedResponse::Json(value),
        Err(_) => ParsedResponse::Raw(clean),
    }
}

/// Extract the first whole number from `text`. `25.000` and `25,000` both read as 25000.
pub fn extract_number(text: &str) -> Option<i64> {
    let found = NUMBER.find(text)?;
    let digits: String = found
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Read a JSON field as a whole number. Fractions are rounded.
pub fn json_integer(value: &Value, key: &str) -> Option<i64> {
    let field = value.get(key)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().map(|f| f.round() as i64))
}

/// Read a non-blank JSON string field, trimmed.
pub fn json_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
