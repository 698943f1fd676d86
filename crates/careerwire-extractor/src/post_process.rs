//! Data-quality rules applied to the model's change records
//!
//! Rules, in order:
//! 1. drop a record if any of its values is the `"Unknown"` sentinel
//! 2. a `new_role` mentioning "retiring" or "leaving" becomes `"Unknown"`
//! 3. drop records whose `new_role` is now `"Unknown"`
//! 4. count the survivors; the post is relevant when any survive
//!
//! A record that passes rule 1 must carry `person_name`, `organization`
//! and `new_role`, otherwise the whole item fails. A `null` organization
//! is accepted and becomes empty.

use crate::error::ExtractorError;
use careerwire_domain::{ChangeRecord, UNKNOWN};
use serde_json::{Map, Value};
use tracing::debug;

/// Role fragments that mark a departure without a new position
const DEPARTURE_MARKERS: [&str; 2] = ["retiring", "leaving"];

/// Cleaned change records with derived count and relevance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessed {
    /// Surviving records, in model order
    pub extracted_info: Vec<ChangeRecord>,
    /// Number of survivors
    pub change_count: usize,
    /// `change_count > 0`
    pub relevant: bool,
}

/// Apply the post-processing rules to a raw `extracted_info` value
pub fn post_process(extracted_info: &Value) -> Result<PostProcessed, ExtractorError> {
    let records = extracted_info.as_array().ok_or_else(|| {
        ExtractorError::InputType(format!(
            "Expected a list for extracted_info, got: {}",
            json_type(extracted_info)
        ))
    })?;

    let mut survivors = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let fields = record.as_object().ok_or_else(|| {
            ExtractorError::PostProcessing(format!(
                "record {} is a {}, expected an object",
                idx,
                json_type(record)
            ))
        })?;

        if fields.values().any(|v| v.as_str() == Some(UNKNOWN)) {
            debug!(record = idx, "Dropping record with unknown field");
            continue;
        }

        let mut change = ChangeRecord::new(
            required_str(fields, "person_name", idx)?,
            organization(fields, idx)?,
            required_str(fields, "new_role", idx)?,
        );

        if is_departure(&change.new_role) {
            change.new_role = UNKNOWN.to_string();
        }

        if change.new_role == UNKNOWN {
            debug!(record = idx, "Dropping departure without a new role");
            continue;
        }

        survivors.push(change);
    }

    let change_count = survivors.len();
    Ok(PostProcessed {
        extracted_info: survivors,
        change_count,
        relevant: change_count > 0,
    })
}

fn is_departure(role: &str) -> bool {
    let role = role.to_lowercase();
    DEPARTURE_MARKERS.iter().any(|marker| role.contains(marker))
}

fn required_str(fields: &Map<String, Value>, key: &str, idx: usize) -> Result<String, ExtractorError> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ExtractorError::PostProcessing(format!(
            "record {} has a {} for '{}', expected a string",
            idx,
            json_type(other),
            key
        ))),
        None => Err(ExtractorError::PostProcessing(format!(
            "record {} is missing '{}'",
            idx, key
        ))),
    }
}

fn organization(fields: &Map<String, Value>, idx: usize) -> Result<String, ExtractorError> {
    match fields.get("organization") {
        Some(Value::Null) => Ok(String::new()),
        _ => required_str(fields, "organization", idx),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn field() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Unknown".to_string()),
            Just("Acme Corp".to_string()),
            Just("Jane Doe".to_string()),
            Just("Chief Financial Officer".to_string()),
            Just("Retiring".to_string()),
            Just("now LEAVING for good".to_string()),
            "[a-zA-Z ]{0,12}",
        ]
    }

    fn record() -> impl Strategy<Value = Value> {
        (field(), field(), field()).prop_map(|(person, org, role)| {
            json!({"person_name": person, "organization": org, "new_role": role})
        })
    }

    proptest! {
        /// Property: survivors never carry the sentinel or a departure role
        #[test]
        fn test_survivors_are_clean(records in prop::collection::vec(record(), 0..12)) {
            let result = post_process(&Value::Array(records)).unwrap();

            for change in &result.extracted_info {
                prop_assert!(!change.has_unknown());
                prop_assert!(!is_departure(&change.new_role));
            }
        }

        /// Property: count and relevance follow from the survivors
        #[test]
        fn test_count_and_relevance(records in prop::collection::vec(record(), 0..12)) {
            let total = records.len();
            let result = post_process(&Value::Array(records)).unwrap();

            prop_assert_eq!(result.change_count, result.extracted_info.len());
            prop_assert_eq!(result.relevant, result.change_count > 0);
            prop_assert!(result.change_count <= total);
        }
    }
}
