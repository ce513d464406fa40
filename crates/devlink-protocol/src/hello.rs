//! Session identification pushed once per opened connection.

use serde_json::{Value, json};

/// Unsolicited identification message sent before any command is handled.
///
/// The controller expects no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    platform: String,
    package: String,
}

impl Hello {
    /// Builds a hello message for the given platform and application identity.
    #[must_use]
    pub fn new(platform: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            package: package.into(),
        }
    }

    /// Platform name advertised to the controller.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Application identity advertised to the controller.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Renders the message as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "type": "hello",
            "platform": self.platform,
            "package": self.package,
        })
    }

    /// Encodes the message as JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
