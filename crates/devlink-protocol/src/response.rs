//! Outbound response envelopes.
//!
//! A response echoes the originating command's `id`, `module` and `action`
//! and carries either action-specific success fields (flattened into the
//! envelope object) or an `error` message.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::command::CommandEnvelope;

/// Envelope fields that success payloads may not shadow.
pub const RESERVED_FIELDS: &[&str] = &["id", "module", "action", "status", "error"];

/// Terminal status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The command completed and its payload fields are present.
    Ok,
    /// The command failed and the `error` field explains why.
    Error,
}

impl Status {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Action-specific success fields.
///
/// Values must already be JSON-safe; handlers base64-encode binary data
/// before inserting it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload with `key` set to `value`.
    ///
    /// Keys listed in [`RESERVED_FIELDS`] are never written to the wire.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        debug_assert!(
            !RESERVED_FIELDS.contains(&key.as_str()),
            "payload field '{key}' shadows an envelope field"
        );
        self.0.insert(key, value.into());
        self
    }

    /// Looks up a payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when the payload has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Success(Payload),
    Failure(String),
}

/// A response sent back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    id: Option<String>,
    module: String,
    action: String,
    outcome: Outcome,
}

impl ResponseEnvelope {
    /// Builds a success response correlated with `command`.
    #[must_use]
    pub fn success(command: &CommandEnvelope, payload: Payload) -> Self {
        Self::correlated(command, Outcome::Success(payload))
    }

    /// Builds an error response correlated with `command`.
    #[must_use]
    pub fn failure(command: &CommandEnvelope, message: impl Into<String>) -> Self {
        Self::correlated(command, Outcome::Failure(message.into()))
    }

    /// Builds a server-initiated push that carries no correlation id.
    #[must_use]
    pub fn unsolicited(
        module: impl Into<String>,
        action: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            id: None,
            module: module.into(),
            action: action.into(),
            outcome: Outcome::Success(payload),
        }
    }

    fn correlated(command: &CommandEnvelope, outcome: Outcome) -> Self {
        Self {
            id: Some(command.id().to_owned()),
            module: command.module().to_owned(),
            action: command.action().to_owned(),
            outcome,
        }
    }

    /// Correlation id echoed from the command, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Module echoed from the command.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Action echoed from the command.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Terminal status.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self.outcome {
            Outcome::Success(_) => Status::Ok,
            Outcome::Failure(_) => Status::Error,
        }
    }

    /// Error message for failed commands.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure(message) => Some(message),
            Outcome::Success(_) => None,
        }
    }

    /// Success payload for completed commands.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure(_) => None,
        }
    }

    /// Renders the envelope as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        if let Some(id) = &self.id {
            object.insert("id".to_owned(), Value::String(id.clone()));
        }
        object.insert("module".to_owned(), Value::String(self.module.clone()));
        object.insert("action".to_owned(), Value::String(self.action.clone()));
        object.insert(
            "status".to_owned(),
            Value::String(self.status().as_str().to_owned()),
        );
        match &self.outcome {
            Outcome::Success(payload) => {
                for (key, value) in &payload.0 {
                    if !RESERVED_FIELDS.contains(&key.as_str()) {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
            Outcome::Failure(message) => {
                object.insert("error".to_owned(), Value::String(message.clone()));
            }
        }
        Value::Object(object)
    }

    /// Encodes the envelope as JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Encodes the envelope as UTF-8 JSON bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.to_json().into_bytes()
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
