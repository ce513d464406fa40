//! Text messaging.

use std::sync::Arc;

use devlink_protocol::{Payload, Permission};

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;
use crate::dispatch::params::ParamReader;

const MODULE: &str = "sms";

/// Sends text messages.
pub trait SmsSender: Send + Sync {
    /// Sends `body` to the number `to`.
    fn send(&self, to: &str, body: &str) -> Result<(), CapabilityError>;
}

pub(crate) fn register(builder: RegistryBuilder, sender: Arc<dyn SmsSender>) -> RegistryBuilder {
    builder.register(MODULE, "send", Some(Permission::Sms), move |params| {
        let to = params
            .optional_text("to")?
            .filter(|to| !to.trim().is_empty())
            .ok_or_else(|| CapabilityError::invalid_parameter("to", "a recipient is required"))?;
        let body = params.text_or("body", "")?;
        sender.send(&to, &body)?;
        Ok(Payload::new())
    })
}
