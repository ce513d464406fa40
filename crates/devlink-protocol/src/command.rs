//! Inbound command envelopes.

use serde_json::{Map, Value};

use crate::errors::DecodeError;

/// Loosely typed command parameters keyed by name.
///
/// Handlers apply their own per-field defaults, so a missing key is never an
/// error at this layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the map with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up a raw parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A command sent by the remote controller.
///
/// The envelope is immutable once decoded. `module` and `action` are kept
/// exactly as received because capability lookups are case-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEnvelope {
    id: String,
    module: String,
    action: String,
    params: Params,
}

impl CommandEnvelope {
    /// Builds a command with no parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            module: module.into(),
            action: action.into(),
            params: Params::new(),
        }
    }

    /// Replaces the parameter map.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Decodes a single frame into a command envelope.
    ///
    /// Trailing whitespace (including a newline delimiter) is ignored. `id`
    /// and `params` are optional; a numeric `id` is kept as its decimal text.
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the frame is empty, is not JSON, is not a
    /// JSON object, or lacks a non-empty `module` or `action` string.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_object(parse_object(bytes)?)
    }

    pub(crate) fn from_object(mut object: Map<String, Value>) -> Result<Self, DecodeError> {
        let module = required_name(&object, "module")?;
        let action = required_name(&object, "action")?;
        let id = correlation_id(object.get("id"))?;
        let params = match object.remove("params") {
            None | Some(Value::Null) => Params::new(),
            Some(Value::Object(map)) => Params::from(map),
            Some(_) => {
                return Err(DecodeError::invalid_structure(
                    "params field must be an object",
                ));
            }
        };

        Ok(Self {
            id,
            module,
            action,
            params,
        })
    }

    /// Correlation token chosen by the controller; empty when absent.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Capability group the command targets.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Operation within the capability group.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Parameters supplied with the command.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Parses a frame into a JSON object.
pub(crate) fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    let trimmed = trim_trailing_whitespace(bytes);
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }

    match serde_json::from_slice(trimmed).map_err(DecodeError::from_json_error)? {
        Value::Object(object) => Ok(object),
        _ => Err(DecodeError::invalid_structure("expected a JSON object")),
    }
}

fn required_name(object: &Map<String, Value>, field: &str) -> Result<String, DecodeError> {
    match object.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        Some(Value::String(_)) => Err(DecodeError::invalid_structure(format!(
            "{field} field is empty"
        ))),
        Some(_) => Err(DecodeError::invalid_structure(format!(
            "{field} field must be a string"
        ))),
        None => Err(DecodeError::invalid_structure(format!(
            "missing {field} field"
        ))),
    }
}

fn correlation_id(value: Option<&Value>) -> Result<String, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(_) => Err(DecodeError::invalid_structure(
            "id field must be a string or number",
        )),
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_full_command() {
        let input = br#"{"id":"7","module":"vibrate","action":"pattern","params":{"pattern":[100,200,100]}}"#;
        let command = CommandEnvelope::decode(input).expect("decode command");
        assert_eq!(command.id(), "7");
        assert_eq!(command.module(), "vibrate");
        assert_eq!(command.action(), "pattern");
        assert_eq!(command.params().get("pattern"), Some(&json!([100, 200, 100])));
    }

    #[test]
    fn id_and_params_are_optional() {
        let command =
            CommandEnvelope::decode(br#"{"module":"battery","action":"level"}"#).expect("decode");
        assert_eq!(command.id(), "");
        assert!(command.params().is_empty());
    }

    #[test]
    fn numeric_id_is_kept_as_text() {
        let command = CommandEnvelope::decode(br#"{"id":42,"module":"battery","action":"level"}"#)
            .expect("decode");
        assert_eq!(command.id(), "42");
    }

    #[test]
    fn ignores_unknown_fields_and_trailing_newline() {
        let input = b"{\"module\":\"toast\",\"action\":\"show\",\"version\":3}\r\n";
        let command = CommandEnvelope::decode(input).expect("decode");
        assert_eq!(command.module(), "toast");
    }

    #[test]
    fn keeps_case_of_module_and_action() {
        let command =
            CommandEnvelope::decode(br#"{"module":"Battery","action":"LEVEL"}"#).expect("decode");
        assert_eq!(command.module(), "Battery");
        assert_eq!(command.action(), "LEVEL");
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::whitespace(b"  \n".as_slice())]
    fn rejects_empty_frames(#[case] input: &[u8]) {
        assert!(matches!(
            CommandEnvelope::decode(input),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            CommandEnvelope::decode(b"not json"),
            Err(DecodeError::MalformedJson { .. })
        ));
    }

    #[rstest]
    #[case::array(r#"[1,2,3]"#)]
    #[case::missing_module(r#"{"action":"level"}"#)]
    #[case::missing_action(r#"{"module":"battery"}"#)]
    #[case::empty_module(r#"{"module":"","action":"level"}"#)]
    #[case::blank_action(r#"{"module":"battery","action":"  "}"#)]
    #[case::numeric_module(r#"{"module":5,"action":"level"}"#)]
    #[case::params_not_object(r#"{"module":"battery","action":"level","params":[1]}"#)]
    #[case::object_id(r#"{"id":{},"module":"battery","action":"level"}"#)]
    fn rejects_invalid_structure(#[case] input: &str) {
        assert!(matches!(
            CommandEnvelope::decode(input.as_bytes()),
            Err(DecodeError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn null_params_default_to_empty() {
        let command =
            CommandEnvelope::decode(br#"{"module":"device","action":"info","params":null}"#)
                .expect("decode");
        assert!(command.params().is_empty());
    }
}
