//! Host-side answers to permission requests.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the host answers an authorization ask for a permission that was not
/// granted up front.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PromptPolicy {
    /// Grant every ask and remember the grant.
    Grant,
    /// Deny every ask.
    #[default]
    Deny,
}

/// A fixed position reported by the configured location provider.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LocationFix {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Horizontal accuracy radius in metres.
    pub accuracy: f32,
}
