//! Classification of inbound frames.
//!
//! Most frames are command envelopes. Controllers written against the older
//! page-driving protocol also send bare control objects such as
//! `{"console":"text"}` or `{"reload":true}`; these carry no `module` or
//! `action` and are reported separately so the session can handle them
//! without routing.

use serde_json::{Map, Value};

use crate::command::{CommandEnvelope, parse_object};
use crate::errors::DecodeError;

/// Bare control directives from the page-driving protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFrame {
    /// Reload the current page.
    Reload,
    /// Navigate to the given URL.
    Navigate(String),
    /// Show a short transient message.
    Toast(String),
    /// Write a line to the bridge log.
    Console(String),
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// A routed command.
    Command(CommandEnvelope),
    /// A control directive.
    Control(ControlFrame),
}

impl InboundFrame {
    /// Decodes a frame, accepting both command envelopes and control objects.
    ///
    /// Objects that name a `module` or `action` are always treated as
    /// commands, so a malformed command is never mistaken for a directive.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the frame is neither a valid command nor
    /// a recognised control object.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let object = parse_object(bytes)?;
        if object.contains_key("module") || object.contains_key("action") {
            return CommandEnvelope::from_object(object).map(Self::Command);
        }

        match control_frame(&object)? {
            Some(control) => Ok(Self::Control(control)),
            None => CommandEnvelope::from_object(object).map(Self::Command),
        }
    }
}

fn control_frame(object: &Map<String, Value>) -> Result<Option<ControlFrame>, DecodeError> {
    if object.contains_key("reload") {
        return Ok(Some(ControlFrame::Reload));
    }
    if let Some(value) = object.get("navigate") {
        return text_field("navigate", value).map(|url| Some(ControlFrame::Navigate(url)));
    }
    if let Some(value) = object.get("toast") {
        return text_field("toast", value).map(|text| Some(ControlFrame::Toast(text)));
    }
    if let Some(value) = object.get("console") {
        return text_field("console", value).map(|text| Some(ControlFrame::Console(text)));
    }
    Ok(None)
}

fn text_field(field: &str, value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        _ => Err(DecodeError::invalid_structure(format!(
            "{field} directive must be a string"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::reload(r#"{"reload":true}"#, ControlFrame::Reload)]
    #[case::navigate(r#"{"navigate":"http://host/next"}"#, ControlFrame::Navigate("http://host/next".to_owned()))]
    #[case::toast(r#"{"toast":"hi"}"#, ControlFrame::Toast("hi".to_owned()))]
    #[case::console(r#"{"console":"log line"}"#, ControlFrame::Console("log line".to_owned()))]
    fn decodes_control_frames(#[case] input: &str, #[case] expected: ControlFrame) {
        let frame = InboundFrame::decode(input.as_bytes()).expect("decode control");
        assert_eq!(frame, InboundFrame::Control(expected));
    }

    #[test]
    fn commands_take_precedence_over_directives() {
        let frame = InboundFrame::decode(br#"{"module":"toast","action":"show","toast":"x"}"#)
            .expect("decode command");
        assert!(matches!(frame, InboundFrame::Command(_)));
    }

    #[test]
    fn malformed_command_is_not_reclassified() {
        let result = InboundFrame::decode(br#"{"module":"toast","console":"x"}"#);
        assert!(matches!(result, Err(DecodeError::InvalidStructure { .. })));
    }

    #[test]
    fn unrecognised_object_reports_missing_module() {
        let error = InboundFrame::decode(br#"{"hello":"there"}"#).expect_err("should fail");
        assert!(error.to_string().contains("missing module field"));
    }

    #[test]
    fn non_text_directive_is_rejected() {
        assert!(InboundFrame::decode(br#"{"console":42}"#).is_err());
    }
}
