//! Camera flash used as a torch.

use std::sync::Arc;

use devlink_protocol::{Payload, Permission};

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;

const MODULE: &str = "torch";

/// Switches the camera flash.
pub trait Torch: Send + Sync {
    /// Turns the flash on or off.
    fn set_enabled(&self, enabled: bool) -> Result<(), CapabilityError>;
}

pub(crate) fn register(builder: RegistryBuilder, torch: Arc<dyn Torch>) -> RegistryBuilder {
    let off = Arc::clone(&torch);
    builder
        .register(MODULE, "on", Some(Permission::Camera), move |_| {
            torch.set_enabled(true)?;
            Ok(Payload::new())
        })
        .register(MODULE, "off", Some(Permission::Camera), move |_| {
            off.set_enabled(false)?;
            Ok(Payload::new())
        })
}
