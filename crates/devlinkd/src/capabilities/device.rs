//! Device identity.

use std::sync::Arc;

use serde::Serialize;

use devlink_protocol::Payload;

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;

const MODULE: &str = "device";

/// Identity reported by the `device.info` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Hardware model name.
    pub model: String,
    /// Hardware manufacturer.
    pub manufacturer: String,
    /// Operating system name.
    pub os: String,
    /// Operating system release.
    pub os_version: String,
    /// Numeric platform API level.
    pub sdk_int: u32,
    /// Application identity of the bridge.
    pub app_name: String,
}

/// Describes the device the bridge runs on.
pub trait DeviceInfoSource: Send + Sync {
    /// Collects the current identity.
    fn info(&self) -> Result<DeviceInfo, CapabilityError>;
}

pub(crate) fn register(
    builder: RegistryBuilder,
    source: Arc<dyn DeviceInfoSource>,
) -> RegistryBuilder {
    builder.register(MODULE, "info", None, move |_| {
        let info = source.info()?;
        let value = serde_json::to_value(&info)
            .map_err(|error| CapabilityError::provider(error.to_string()))?;
        Ok(Payload::new().with("info", value))
    })
}
