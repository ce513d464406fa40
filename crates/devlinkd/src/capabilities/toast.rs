//! Short transient on-screen messages.

use std::sync::Arc;

use devlink_protocol::Payload;

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;
use crate::dispatch::params::ParamReader;

const MODULE: &str = "toast";

/// Shows transient messages to the device user.
pub trait Toaster: Send + Sync {
    /// Shows `message` briefly.
    fn show(&self, message: &str) -> Result<(), CapabilityError>;
}

pub(crate) fn register(builder: RegistryBuilder, toaster: Arc<dyn Toaster>) -> RegistryBuilder {
    builder.register(MODULE, "show", None, move |params| {
        toaster.show(&params.text_or("message", "")?)?;
        Ok(Payload::new())
    })
}
