//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use url::Url;

use devlink_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::session::TransportError;

/// Lifecycle events observed during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Dialling the given address.
    SessionConnecting(String),
    /// Connection open to the given address.
    SessionOpened(String),
    /// Connection closed with the given reason.
    SessionClosed(String),
    /// Transport failure with a message.
    SessionFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_connecting(&self, address: &Url) {
        self.record(HealthEvent::SessionConnecting(address.to_string()));
    }

    fn session_opened(&self, address: &Url) {
        self.record(HealthEvent::SessionOpened(address.to_string()));
    }

    fn session_closed(&self, reason: &str) {
        self.record(HealthEvent::SessionClosed(reason.to_owned()));
    }

    fn session_failed(&self, error: &TransportError) {
        self.record(HealthEvent::SessionFailed(error.to_string()));
    }
}
