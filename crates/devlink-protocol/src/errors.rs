//! Decode failures for inbound frames.

use thiserror::Error;

/// Errors raised while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame was empty after trimming trailing whitespace.
    #[error("empty frame")]
    Empty,

    /// The frame is not a well-formed JSON document.
    #[error("malformed JSON: {message}")]
    MalformedJson {
        /// Parser diagnostic.
        message: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The frame parsed but does not have the shape of an envelope.
    #[error("invalid envelope: {message}")]
    InvalidStructure {
        /// Description of the structural problem.
        message: String,
    },
}

impl DecodeError {
    /// Creates a malformed JSON error from a parser error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJson {
            message: source.to_string(),
            source,
        }
    }

    /// Creates an invalid structure error.
    #[must_use]
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
