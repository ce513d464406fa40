//! Authorization identifiers for sensitive capabilities.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Authorization identifiers that gate capabilities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Permission {
    /// Access to the device position.
    Location,
    /// Sending text messages.
    Sms,
    /// Camera hardware, including the flash unit.
    Camera,
    /// Audio capture.
    Microphone,
}

impl Permission {
    /// Every permission known to the bridge.
    pub const ALL: [Self; 4] = [Self::Location, Self::Sms, Self::Camera, Self::Microphone];
}

/// Errors encountered while parsing a [`Permission`] from text.
pub type PermissionParseError = strum::ParseError;
