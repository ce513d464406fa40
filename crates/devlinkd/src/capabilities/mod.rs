//! Device capabilities exposed to the controller.
//!
//! Each submodule pairs a provider trait with the handlers that translate
//! command parameters into provider calls. Providers are host-specific; the
//! [`host`] module supplies the workstation implementations used by the
//! binary, and tests substitute their own doubles.

pub mod battery;
pub mod device;
pub mod filesystem;
pub mod host;
pub mod location;
pub mod notify;
pub mod recorder;
pub mod sms;
pub mod toast;
pub mod torch;
pub mod vibrate;

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::{CapabilityRegistry, DispatchError};

pub use battery::{BatteryGauge, SysfsBattery};
pub use device::{DeviceInfo, DeviceInfoSource};
pub use filesystem::{FileStore, SandboxFileStore};
pub use location::{FixedLocationProvider, LocationProvider, LocationService};
pub use notify::Notifier;
pub use recorder::{AudioRecorder, RecorderSlot};
pub use sms::SmsSender;
pub use toast::Toaster;
pub use torch::Torch;
pub use vibrate::Vibrator;

/// Tracing target for capability handlers and host providers.
pub(crate) const CAPABILITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::capabilities");

/// Faults raised by capability handlers and providers.
///
/// The dispatcher converts these into error responses carrying the display
/// message; they never end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The requested resource does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// The capability cannot serve the request right now.
    #[error("unavailable: {reason}")]
    Unavailable {
        /// Why the capability is unavailable.
        reason: String,
    },

    /// A parameter was present but unusable.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// Host I/O failed.
    #[error("IO error: {message}")]
    Io {
        /// Rendered I/O error.
        message: String,
    },

    /// The provider reported a failure of its own.
    #[error("provider error: {message}")]
    Provider {
        /// Provider-supplied description.
        message: String,
    },
}

impl CapabilityError {
    /// Creates a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error from a host error.
    pub fn io(error: &io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }

    /// Creates a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

/// The full set of providers backing the capability catalogue.
#[derive(Clone)]
pub struct Capabilities {
    /// Vibration motor.
    pub vibrator: Arc<dyn Vibrator>,
    /// Transient on-screen messages.
    pub toaster: Arc<dyn Toaster>,
    /// System notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Sandboxed file storage.
    pub files: Arc<dyn FileStore>,
    /// Battery charge gauge.
    pub battery: Arc<dyn BatteryGauge>,
    /// Location providers in priority order.
    pub location: Arc<LocationService>,
    /// Text message sender.
    pub sms: Arc<dyn SmsSender>,
    /// Camera flash.
    pub torch: Arc<dyn Torch>,
    /// Single-instance audio recorder.
    pub recorder: Arc<RecorderSlot>,
    /// Device identity.
    pub device: Arc<dyn DeviceInfoSource>,
}

impl Capabilities {
    /// Builds the registry that routes commands to these providers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateRegistration`] if two handlers claim
    /// the same module and action.
    pub fn registry(&self) -> Result<CapabilityRegistry, DispatchError> {
        let builder = CapabilityRegistry::builder();
        let builder = vibrate::register(builder, Arc::clone(&self.vibrator));
        let builder = toast::register(builder, Arc::clone(&self.toaster));
        let builder = notify::register(builder, Arc::clone(&self.notifier));
        let builder = filesystem::register(builder, Arc::clone(&self.files));
        let builder = battery::register(builder, Arc::clone(&self.battery));
        let builder = location::register(builder, Arc::clone(&self.location));
        let builder = sms::register(builder, Arc::clone(&self.sms));
        let builder = torch::register(builder, Arc::clone(&self.torch));
        let builder = recorder::register(builder, Arc::clone(&self.recorder));
        let builder = device::register(builder, Arc::clone(&self.device));
        builder.build()
    }
}
