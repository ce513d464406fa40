//! Typed access to loosely typed command parameters.
//!
//! A missing or `null` parameter takes the handler's default. A parameter
//! present with the wrong JSON type is a handler fault.

use serde_json::Value;

use devlink_protocol::Params;

use crate::capabilities::CapabilityError;

/// Readers used by capability handlers.
pub(crate) trait ParamReader {
    /// Reads a string parameter, falling back to `default`.
    fn text_or(&self, name: &str, default: &str) -> Result<String, CapabilityError>;

    /// Reads a string parameter that has no default.
    fn optional_text(&self, name: &str) -> Result<Option<String>, CapabilityError>;

    /// Reads a non-negative integer parameter, falling back to `default`.
    fn millis_or(&self, name: &str, default: u64) -> Result<u64, CapabilityError>;

    /// Reads a list of durations. Entries that are not non-negative integers
    /// take `fallback`; a missing list is empty.
    fn millis_list(&self, name: &str, fallback: u64) -> Result<Vec<u64>, CapabilityError>;
}

impl ParamReader for Params {
    fn text_or(&self, name: &str, default: &str) -> Result<String, CapabilityError> {
        Ok(self
            .optional_text(name)?
            .unwrap_or_else(|| default.to_owned()))
    }

    fn optional_text(&self, name: &str) -> Result<Option<String>, CapabilityError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => Err(wrong_type(name, "a string", other)),
        }
    }

    fn millis_or(&self, name: &str, default: u64) -> Result<u64, CapabilityError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(number)) => number.as_u64().ok_or_else(|| {
                CapabilityError::invalid_parameter(name, "expected a non-negative integer")
            }),
            Some(other) => Err(wrong_type(name, "a non-negative integer", other)),
        }
    }

    fn millis_list(&self, name: &str, fallback: u64) -> Result<Vec<u64>, CapabilityError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries
                .iter()
                .map(|entry| entry.as_u64().unwrap_or(fallback))
                .collect()),
            Some(other) => Err(wrong_type(name, "an array", other)),
        }
    }
}

fn wrong_type(name: &str, expected: &str, found: &Value) -> CapabilityError {
    CapabilityError::invalid_parameter(name, format!("expected {expected}, found {}", kind(found)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_values_take_defaults() {
        let params = Params::new();
        assert_eq!(params.text_or("title", "devlink").expect("text"), "devlink");
        assert_eq!(params.millis_or("duration", 200).expect("millis"), 200);
        assert!(params.millis_list("pattern", 100).expect("list").is_empty());
        assert_eq!(params.optional_text("to").expect("text"), None);
    }

    #[test]
    fn null_counts_as_missing() {
        let params = Params::new().with("duration", Value::Null);
        assert_eq!(params.millis_or("duration", 200).expect("millis"), 200);
    }

    #[test]
    fn non_numeric_pattern_entries_fall_back() {
        let params = Params::new().with("pattern", json!([300, "x", null, 50]));
        assert_eq!(
            params.millis_list("pattern", 100).expect("list"),
            vec![300, 100, 100, 50]
        );
    }

    #[rstest]
    #[case::string_duration(json!("long"))]
    #[case::negative_duration(json!(-5))]
    #[case::fractional_duration(json!(1.5))]
    fn rejects_unusable_durations(#[case] value: Value) {
        let params = Params::new().with("duration", value);
        let error = params.millis_or("duration", 200).expect_err("should fail");
        assert!(matches!(error, CapabilityError::InvalidParameter { ref name, .. } if name == "duration"));
    }

    #[test]
    fn rejects_non_string_text() {
        let params = Params::new().with("message", 5);
        let error = params.text_or("message", "").expect_err("should fail");
        assert_eq!(
            error.to_string(),
            "invalid parameter 'message': expected a string, found a number"
        );
    }
}
