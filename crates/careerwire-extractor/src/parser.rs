//! Parse completion text into a raw extraction

use crate::error::ExtractorError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Category used when the model does not name one
pub const DEFAULT_CATEGORY: &str = "5";

/// The model's answer, decoded but not yet post-processed
///
/// `extracted_info` stays a raw JSON value: its shape is checked by the
/// post-processor, which owns that failure class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawExtraction {
    /// Poster name as returned by the model
    #[serde(default)]
    pub poster_name: Option<String>,

    /// Category code, normalized to a string
    #[serde(default = "default_category", deserialize_with = "category")]
    pub post_category: String,

    /// The model's own change count, superseded by post-processing
    #[serde(default, deserialize_with = "lenient_count")]
    pub change_count: usize,

    /// The model's own relevance flag, superseded by post-processing
    #[serde(default, deserialize_with = "lenient_bool")]
    pub relevant: bool,

    /// Change records exactly as returned
    #[serde(default = "empty_list")]
    pub extracted_info: Value,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => default_category(),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Decode the completion text
///
/// Surrounding whitespace and a Markdown code fence are tolerated. The
/// root must be a JSON object.
pub fn parse_completion(response: &str) -> Result<RawExtraction, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::MalformedResponse(format!("JSON parse error: {}", e)))?;

    if !json.is_object() {
        return Err(ExtractorError::MalformedResponse(
            "Expected a JSON object".to_string(),
        ));
    }

    Ok(serde_json::from_value(json)?)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    let Some(fenced) = trimmed.strip_prefix("```") else {
        return Ok(trimmed);
    };

    // Drop the info string ("json") on the opening line
    let body = match fenced.find('\n') {
        Some(pos) => &fenced[pos + 1..],
        None => {
            return Err(ExtractorError::MalformedResponse(
                "Empty code block".to_string(),
            ))
        }
    };

    Ok(body.trim_end().trim_end_matches("```").trim())
}
