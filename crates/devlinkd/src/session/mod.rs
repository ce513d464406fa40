//! Connection session between the bridge and a remote controller.
//!
//! A session owns exactly one transport. Opening it dials the controller,
//! sends the [`Hello`] identification and moves to [`SessionState::Open`].
//! [`Session::run`] then handles one inbound frame at a time in arrival
//! order, forwards responses that complete after a permission answer, and
//! periodically expires permission asks nobody answered.
//!
//! Only failures to open are returned to the caller. Undecodable frames and
//! failed sends are logged and skipped.

mod address;
mod transport;
mod websocket;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use devlink_protocol::{ControlFrame, Hello, InboundFrame, ResponseEnvelope};

use crate::capabilities::Toaster;
use crate::dispatch::{Dispatcher, Routed};
use crate::health::{HealthReporter, StructuredHealthReporter};

pub use address::{AddressError, resolve_address};
pub use transport::{Connector, Frame, Transport, TransportError};
pub use websocket::{WebSocketConnector, WebSocketTransport};

/// Tracing target for session events.
pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Default connection handshake budget.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How often unanswered permission asks are checked for expiry.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection.
    Disconnected,
    /// Dialling the controller.
    Connecting,
    /// Connected and exchanging frames.
    Open,
    /// Shutting the connection down.
    Closing,
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The controller closed the connection or the stream ended.
    RemoteClosed(Option<String>),
    /// The transport failed while receiving.
    TransportFailed(String),
    /// The shutdown future completed.
    Shutdown,
}

/// Errors surfaced by [`Session::open`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The controller address could not be resolved.
    #[error(transparent)]
    Address(#[from] AddressError),
    /// `open` was called on a session that is not disconnected.
    #[error("session is already {state:?}")]
    AlreadyActive {
        /// Current state.
        state: SessionState,
    },
    /// Dialling the controller failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

enum Event {
    Inbound(Option<Result<Frame, TransportError>>),
    Deferred(ResponseEnvelope),
    Sweep,
    Shutdown,
}

/// A connection to one controller.
pub struct Session<C: Connector> {
    connector: C,
    transport: Option<C::Transport>,
    state: SessionState,
    identity: Hello,
    dispatcher: Dispatcher,
    deferred: UnboundedReceiver<ResponseEnvelope>,
    toaster: Option<Arc<dyn Toaster>>,
    reporter: Arc<dyn HealthReporter>,
    connect_timeout: Duration,
    sweep_interval: Duration,
}

impl<C: Connector> Session<C> {
    /// Creates a disconnected session.
    ///
    /// `deferred` receives the responses the dispatcher's permission gate
    /// completes out of band.
    #[must_use]
    pub fn new(
        connector: C,
        dispatcher: Dispatcher,
        deferred: UnboundedReceiver<ResponseEnvelope>,
        identity: Hello,
    ) -> Self {
        Self {
            connector,
            transport: None,
            state: SessionState::Disconnected,
            identity,
            dispatcher,
            deferred,
            toaster: None,
            reporter: Arc::new(StructuredHealthReporter::new()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Shows `toast` control frames through `toaster`.
    #[must_use]
    pub fn with_toaster(mut self, toaster: Arc<dyn Toaster>) -> Self {
        self.toaster = Some(toaster);
        self
    }

    /// Reports lifecycle events to `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Limits how long [`Session::open`] waits for the handshake.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how often expired permission asks are swept.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The dispatcher handling inbound commands.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Connects to `address` and sends the hello message.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session is not disconnected, the
    /// address cannot be resolved, or the connection fails or times out.
    pub async fn open(&mut self, address: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::AlreadyActive { state: self.state });
        }
        let url = resolve_address(address)?;

        self.state = SessionState::Connecting;
        self.reporter.session_connecting(&url);
        let transport = match time::timeout(self.connect_timeout, self.connector.connect(&url)).await
        {
            Ok(Ok(transport)) => transport,
            Ok(Err(error)) => return Err(self.connect_failed(error)),
            Err(_) => {
                let error = TransportError::ConnectTimeout {
                    address: url.to_string(),
                    timeout_ms: u64::try_from(self.connect_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                };
                return Err(self.connect_failed(error));
            }
        };

        self.transport = Some(transport);
        self.state = SessionState::Open;
        self.reporter.session_opened(&url);
        let hello = self.identity.to_json();
        self.send_text(hello).await;
        Ok(())
    }

    fn connect_failed(&mut self, error: TransportError) -> SessionError {
        self.state = SessionState::Disconnected;
        self.reporter.session_failed(&error);
        SessionError::Transport(error)
    }

    /// Sends a response. Failures and sends on a session that is not open
    /// are logged and dropped.
    pub async fn send(&mut self, response: ResponseEnvelope) {
        self.send_text(response.to_json()).await;
    }

    async fn send_text(&mut self, text: String) {
        if self.state != SessionState::Open {
            debug!(
                target: SESSION_TARGET,
                state = ?self.state,
                "session not open; dropping outbound frame"
            );
            return;
        }
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        if let Err(error) = transport.send_text(text).await {
            warn!(
                target: SESSION_TARGET,
                error = %error,
                "failed to send frame"
            );
        }
    }

    /// Handles one inbound frame: decode, route and reply when the command
    /// completes immediately.
    pub async fn on_receive(&mut self, bytes: &[u8]) {
        if self.state != SessionState::Open {
            debug!(
                target: SESSION_TARGET,
                state = ?self.state,
                bytes = bytes.len(),
                "ignoring frame received while not open"
            );
            return;
        }
        let frame = match InboundFrame::decode(bytes) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(
                    target: SESSION_TARGET,
                    error = %error,
                    bytes = bytes.len(),
                    "dropping undecodable frame"
                );
                return;
            }
        };

        match frame {
            InboundFrame::Command(command) => match self.dispatcher.route(command) {
                Routed::Immediate(response) => self.send(response).await,
                Routed::Deferred { permission } => debug!(
                    target: SESSION_TARGET,
                    permission = %permission,
                    "command waiting for permission"
                ),
            },
            InboundFrame::Control(control) => self.apply_control(control),
        }
    }

    fn apply_control(&self, control: ControlFrame) {
        match control {
            ControlFrame::Console(text) => {
                info!(target: SESSION_TARGET, text = %text, "controller console");
            }
            ControlFrame::Toast(text) => match &self.toaster {
                Some(toaster) => {
                    if let Err(error) = toaster.show(&text) {
                        warn!(target: SESSION_TARGET, error = %error, "toast directive failed");
                    }
                }
                None => info!(target: SESSION_TARGET, text = %text, "toast directive"),
            },
            ControlFrame::Reload => {
                info!(target: SESSION_TARGET, "no embedded view; ignoring reload directive");
            }
            ControlFrame::Navigate(url) => info!(
                target: SESSION_TARGET,
                url = %url,
                "no embedded view; ignoring navigate directive"
            ),
        }
    }

    /// Closes the connection. Closing a closed session does nothing.
    pub async fn close(&mut self, reason: &str) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        self.state = SessionState::Closing;
        if let Err(error) = transport.close(reason).await {
            debug!(
                target: SESSION_TARGET,
                error = %error,
                "close handshake failed"
            );
        }
        self.state = SessionState::Disconnected;
        self.reporter.session_closed(reason);
    }

    /// Serves the connection until the controller leaves, the transport
    /// fails or `shutdown` completes. The session is closed on return.
    pub async fn run<F>(&mut self, shutdown: F) -> SessionEnd
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut sweep = time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let Some(transport) = self.transport.as_mut() else {
                return SessionEnd::RemoteClosed(None);
            };
            let event = tokio::select! {
                frame = transport.next_frame() => Event::Inbound(frame),
                Some(response) = self.deferred.recv() => Event::Deferred(response),
                _ = sweep.tick() => Event::Sweep,
                () = &mut shutdown => Event::Shutdown,
            };

            match event {
                Event::Inbound(Some(Ok(Frame::Text(text)))) => self.on_receive(text.as_bytes()).await,
                Event::Inbound(Some(Ok(Frame::Binary(bytes)))) => self.on_receive(&bytes).await,
                Event::Inbound(Some(Ok(Frame::Close(reason)))) => {
                    info!(
                        target: SESSION_TARGET,
                        reason = ?reason,
                        "controller closed the connection"
                    );
                    self.close("remote closed").await;
                    return SessionEnd::RemoteClosed(reason);
                }
                Event::Inbound(None) => {
                    self.close("stream ended").await;
                    return SessionEnd::RemoteClosed(None);
                }
                Event::Inbound(Some(Err(error))) => {
                    self.reporter.session_failed(&error);
                    self.close("transport failure").await;
                    return SessionEnd::TransportFailed(error.to_string());
                }
                Event::Deferred(response) => self.send(response).await,
                Event::Sweep => {
                    let expired = self.dispatcher.expire_pending(Instant::now());
                    if expired > 0 {
                        debug!(
                            target: SESSION_TARGET,
                            expired,
                            "expired unanswered permission asks"
                        );
                    }
                }
                Event::Shutdown => {
                    self.close("shutdown").await;
                    return SessionEnd::Shutdown;
                }
            }
        }
    }
}
