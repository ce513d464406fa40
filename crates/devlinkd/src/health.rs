//! Structured health reporting for bridge lifecycle events.

use std::sync::Arc;

use url::Url;

use devlink_config::Config;

use crate::bootstrap::BootstrapError;
use crate::session::TransportError;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the controller is dialled.
    fn session_connecting(&self, address: &Url);

    /// Invoked once the connection is open.
    fn session_opened(&self, address: &Url);

    /// Invoked after the connection is closed.
    fn session_closed(&self, reason: &str);

    /// Invoked when the transport fails.
    fn session_failed(&self, error: &TransportError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_connecting(&self, address: &Url) {
        (**self).session_connecting(address);
    }

    fn session_opened(&self, address: &Url) {
        (**self).session_opened(address);
    }

    fn session_closed(&self, reason: &str) {
        (**self).session_closed(reason);
    }

    fn session_failed(&self, error: &TransportError) {
        (**self).session_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "devlinkd::health",
            event = "bootstrap_starting",
            "starting bridge bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "devlinkd::health",
            event = "bootstrap_succeeded",
            app_id = %config.app_id(),
            data_dir = %config.data_dir(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "devlinkd::health",
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn session_connecting(&self, address: &Url) {
        tracing::info!(
            target: "devlinkd::health",
            event = "session_connecting",
            address = %address,
            "connecting to controller"
        );
    }

    fn session_opened(&self, address: &Url) {
        tracing::info!(
            target: "devlinkd::health",
            event = "session_opened",
            address = %address,
            "controller connection open"
        );
    }

    fn session_closed(&self, reason: &str) {
        tracing::info!(
            target: "devlinkd::health",
            event = "session_closed",
            reason,
            "controller connection closed"
        );
    }

    fn session_failed(&self, error: &TransportError) {
        tracing::error!(
            target: "devlinkd::health",
            event = "session_failed",
            error = %error,
            "controller connection failed"
        );
    }
}
