//! Message transport abstraction.
//!
//! The session only needs to dial an address, exchange whole text frames and
//! close. The websocket implementation lives in [`super::websocket`]; tests
//! drive the session over in-memory channels.

use std::future::Future;

use thiserror::Error;
use url::Url;

/// A whole inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text message.
    Text(String),
    /// Binary message.
    Binary(Vec<u8>),
    /// The peer closed the connection, optionally giving a reason.
    Close(Option<String>),
}

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("failed to connect to {address}: {message}")]
    Connect {
        /// Address being dialled.
        address: String,
        /// Rendered cause.
        message: String,
    },
    /// The connection was not established in time.
    #[error("timed out connecting to {address} after {timeout_ms} ms")]
    ConnectTimeout {
        /// Address being dialled.
        address: String,
        /// Budget that elapsed.
        timeout_ms: u64,
    },
    /// A frame could not be sent.
    #[error("failed to send frame: {message}")]
    Send {
        /// Rendered cause.
        message: String,
    },
    /// A frame could not be received.
    #[error("failed to receive frame: {message}")]
    Receive {
        /// Rendered cause.
        message: String,
    },
    /// The connection is already closed.
    #[error("connection closed")]
    Closed,
}

impl TransportError {
    /// Creates a connect error.
    pub fn connect(address: &Url, cause: impl ToString) -> Self {
        Self::Connect {
            address: address.to_string(),
            message: cause.to_string(),
        }
    }

    /// Creates a send error.
    pub fn send(cause: impl ToString) -> Self {
        Self::Send {
            message: cause.to_string(),
        }
    }

    /// Creates a receive error.
    pub fn receive(cause: impl ToString) -> Self {
        Self::Receive {
            message: cause.to_string(),
        }
    }
}

/// Dials controllers.
pub trait Connector {
    /// Connection produced by a successful dial.
    type Transport: Transport;

    /// Opens a connection to `address`.
    fn connect(
        &self,
        address: &Url,
    ) -> impl Future<Output = Result<Self::Transport, TransportError>>;
}

/// An open, exclusively owned connection.
pub trait Transport {
    /// Sends one text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), TransportError>>;

    /// Waits for the next inbound frame. `None` means the stream ended.
    ///
    /// Implementations must be cancel-safe: dropping the future before it
    /// completes loses no frame.
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<Frame, TransportError>>>;

    /// Closes the connection with `reason`.
    fn close(&mut self, reason: &str) -> impl Future<Output = Result<(), TransportError>>;
}
