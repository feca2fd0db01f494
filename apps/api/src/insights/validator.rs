//! Schema Validator: parses sanitized model text and checks top-level required keys.
//!
//! Only presence is checked. Nested shapes belong to the model and are opaque here;
//! `render::sections` decides how to display them.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::insights::errors::AttemptError;

/// Checked in this order; the first missing one is reported.
pub const REQUIRED_KEYS: [&str; 4] = [
    "best_field",
    "roadmap",
    "result_analysis",
    "career_recommendations",
];

/// Passed through untouched when present.
pub const OPTIONAL_KEYS: [&str; 6] = [
    "skill_recommendations",
    "skill_gaps",
    "future_plans",
    "daily_habits",
    "certifications",
    "additional_insights",
];

/// A validated insights object. Always a JSON object holding every key in `REQUIRED_KEYS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InsightsReport(Map<String, Value>);

#[cfg(test)]
impl InsightsReport {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Keys outside both lists are kept, but noted.
fn unrecognised_keys(map: &Map<String, Value>) -> Vec<&str> {
    map.keys()
        .map(String::as_str)
        .filter(|k| !REQUIRED_KEYS.contains(k) && !OPTIONAL_KEYS.contains(k))
        .collect()
}

impl TryFrom<Value> for InsightsReport {
    type Error = AttemptError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(AttemptError::SchemaViolation {
                missing_key: REQUIRED_KEYS[0],
            });
        };
        if let Some(missing_key) = REQUIRED_KEYS.into_iter().find(|k| !map.contains_key(*k)) {
            return Err(AttemptError::SchemaViolation { missing_key });
        }
        let extra = unrecognised_keys(&map);
        if !extra.is_empty() {
            debug!("Insights carry unrecognised keys: {}", extra.join(", "));
        }
        Ok(InsightsReport(map))
    }
}

/// Parses `text` and validates required keys.
pub fn validate_insights(text: &str) -> Result<InsightsReport, AttemptError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| AttemptError::MalformedPayload(e.to_string()))?;
    InsightsReport::try_from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Value {
        json!({
            "best_field": {},
            "roadmap": {},
            "result_analysis": {},
            "career_recommendations": []
        })
    }

    #[test]
    fn test_valid_minimal_report() {
        let report = validate_insights(&full().to_string()).unwrap();
        assert_eq!(report.into_value(), full());
    }

    #[test]
    fn test_optional_keys_pass_through_opaquely() {
        let mut value = full();
        value["future_plans"] = json!("just a sentence");
        value["unexpected"] = json!(42);
        let report = validate_insights(&value.to_string()).unwrap();
        assert_eq!(report.get("future_plans"), Some(&json!("just a sentence")));
        assert_eq!(report.get("unexpected"), Some(&json!(42)));
    }

    #[test]
    fn test_only_unlisted_keys_are_unrecognised() {
        let mut value = full();
        value["daily_habits"] = json!([]);
        value["additional_insights"] = json!({});
        value["mood"] = json!("curious");
        let Value::Object(map) = value else { unreachable!() };
        assert_eq!(unrecognised_keys(&map), vec!["mood"]);
    }

    #[test]
    fn test_nested_shapes_not_checked() {
        let value = json!({
            "best_field": "text instead of object",
            "roadmap": null,
            "result_analysis": [1, 2, 3],
            "career_recommendations": {"not": "a list"}
        });
        assert!(validate_insights(&value.to_string()).is_ok());
    }

    #[test]
    fn test_each_missing_key_reported() {
        for key in REQUIRED_KEYS {
            let mut value = full();
            value.as_object_mut().unwrap().remove(key);
            let err = validate_insights(&value.to_string()).unwrap_err();
            assert_eq!(err, AttemptError::SchemaViolation { missing_key: key });
        }
    }

    #[test]
    fn test_first_missing_key_in_fixed_order() {
        let value = json!({"best_field": {}, "career_recommendations": []});
        let err = validate_insights(&value.to_string()).unwrap_err();
        assert_eq!(
            err,
            AttemptError::SchemaViolation {
                missing_key: "roadmap"
            }
        );

        let err = validate_insights("{}").unwrap_err();
        assert_eq!(
            err,
            AttemptError::SchemaViolation {
                missing_key: "best_field"
            }
        );
    }

    #[test]
    fn test_non_object_is_schema_violation() {
        let err = validate_insights("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), "SchemaViolation");
    }

    #[test]
    fn test_unparseable_is_malformed_payload() {
        let err = validate_insights("{\"best_field\": ").unwrap_err();
        match err {
            AttemptError::MalformedPayload(diag) => assert!(diag.contains("EOF")),
            other => panic!("expected MalformedPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_report_serializes_as_plain_object() {
        let report = validate_insights(&full().to_string()).unwrap();
        assert_eq!(serde_json::to_value(&report).unwrap(), full());
    }
}
