//! System notifications.

use std::sync::Arc;

use devlink_protocol::Payload;

use super::CapabilityError;
use crate::dispatch::RegistryBuilder;
use crate::dispatch::params::ParamReader;

const MODULE: &str = "notify";
const DEFAULT_TITLE: &str = "devlink";

/// Posts and clears system notifications.
pub trait Notifier: Send + Sync {
    /// Posts a notification and returns its identifier.
    fn show(&self, title: &str, message: &str) -> Result<u32, CapabilityError>;

    /// Removes every notification this bridge posted.
    fn clear_all(&self) -> Result<(), CapabilityError>;
}

pub(crate) fn register(builder: RegistryBuilder, notifier: Arc<dyn Notifier>) -> RegistryBuilder {
    let clearing = Arc::clone(&notifier);
    builder
        .register(MODULE, "show", None, move |params| {
            let title = params.text_or("title", DEFAULT_TITLE)?;
            let message = params.text_or("message", "")?;
            let id = notifier.show(&title, &message)?;
            Ok(Payload::new().with("notificationId", id))
        })
        .register(MODULE, "clear", None, move |_| {
            clearing.clear_all()?;
            Ok(Payload::new())
        })
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use serde_json::json;

    use devlink_protocol::Params;

    use super::*;
    use crate::dispatch::CapabilityRegistry;

    mock! {
        Tray {}
        impl Notifier for Tray {
            fn show(&self, title: &str, message: &str) -> Result<u32, CapabilityError>;
            fn clear_all(&self) -> Result<(), CapabilityError>;
        }
    }

    #[test]
    fn show_applies_default_title_and_returns_id() {
        let mut tray = MockTray::new();
        tray.expect_show()
            .withf(|title, message| title == "devlink" && message == "build finished")
            .times(1)
            .returning(|_, _| Ok(17));
        let registry = register(CapabilityRegistry::builder(), Arc::new(tray))
            .build()
            .expect("build registry");

        let payload = registry
            .lookup(MODULE, "show")
            .expect("registered")
            .invoke(&Params::new().with("message", "build finished"))
            .expect("show");
        assert_eq!(payload.get("notificationId"), Some(&json!(17)));
    }
}
