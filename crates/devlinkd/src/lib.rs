//! Device capability bridge.
//!
//! `devlinkd` connects out to a remote controller and lets it drive the
//! capabilities of the device it runs on: vibration, notifications, files,
//! battery, location, text messages, the camera flash, audio recording and
//! device identity. The controller sends JSON command envelopes; the bridge
//! routes each one to a registered handler, passes sensitive commands through
//! a permission gate, and answers with exactly one correlated response.
//!
//! The crate is arranged in layers:
//!
//! - [`dispatch`] holds the static capability registry, the permission gate
//!   and the dispatcher. It is synchronous and transport-agnostic.
//! - [`capabilities`] defines one provider trait per capability group plus
//!   the handlers that adapt command parameters to provider calls.
//! - [`session`] owns the connection: it dials the controller, sends the
//!   hello message, feeds inbound frames to the dispatcher and forwards the
//!   responses that complete after a permission answer.
//!
//! Bootstrap follows the same shape as the binary: load configuration,
//! initialise telemetry, build the providers for the host, then hand the
//! assembled [`Bridge`] to a session.

mod authority;
mod bootstrap;
pub mod capabilities;
pub mod dispatch;
mod health;
pub mod session;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

pub use authority::PolicyAuthority;
pub use bootstrap::{
    BootstrapError, Bridge, BridgeHost, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    WorkstationHost, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};

use session::{SessionEnd, SessionError, WebSocketConnector};

/// Errors that stop the bridge before its session runs.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// No controller address was configured.
    #[error("no controller address configured; pass --address or set DEVLINK_ADDRESS")]
    MissingAddress,
    /// The session could not be opened.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Runs the bridge with the process configuration until the controller
/// disconnects or Ctrl-C is pressed.
///
/// # Errors
///
/// Returns [`BridgeError`] when bootstrap fails, no address is configured or
/// the controller cannot be reached.
pub async fn run_bridge() -> Result<SessionEnd, BridgeError> {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let bridge = bootstrap_with(&SystemConfigLoader, reporter, &WorkstationHost)?;
    run_with(bridge, WebSocketConnector, shutdown_signal()).await
}

/// Opens a session for `bridge` and serves it until `shutdown` completes or
/// the connection ends.
///
/// # Errors
///
/// Returns [`BridgeError`] when no address is configured or the session
/// cannot be opened.
pub async fn run_with<C, F>(
    bridge: Bridge,
    connector: C,
    shutdown: F,
) -> Result<SessionEnd, BridgeError>
where
    C: session::Connector,
    F: Future<Output = ()>,
{
    let address = bridge
        .config()
        .address()
        .ok_or(BridgeError::MissingAddress)?
        .to_owned();
    let mut session = bridge.into_session(connector);
    session.open(&address).await?;
    Ok(session.run(shutdown).await)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(
            target: session::SESSION_TARGET,
            error = %error,
            "failed to listen for Ctrl-C; running until the controller disconnects"
        );
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
