//! In-memory transport for driving sessions without sockets.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

use crate::session::{Connector, Frame, Transport, TransportError};

/// Hands out one pre-built transport, or refuses or stalls.
pub struct MemoryConnector {
    link: Mutex<Option<MemoryTransport>>,
    stall: bool,
}

impl MemoryConnector {
    /// Connector whose every dial fails.
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            link: Mutex::new(None),
            stall: false,
        }
    }

    /// Connector whose dial never completes.
    #[must_use]
    pub fn stalling() -> Self {
        Self {
            link: Mutex::new(None),
            stall: true,
        }
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, address: &Url) -> Result<MemoryTransport, TransportError> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        self.link
            .lock()
            .expect("connector mutex poisoned")
            .take()
            .ok_or_else(|| TransportError::connect(address, "connection refused"))
    }
}

/// Bridge side of an in-memory link.
pub struct MemoryTransport {
    inbound: UnboundedReceiver<Frame>,
    outbound: UnboundedSender<String>,
    closed: bool,
}

impl Transport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outbound.send(text).map_err(|_| TransportError::Closed)
    }

    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self, _reason: &str) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}

/// Controller side of an in-memory link.
pub struct MemoryPeer {
    inbound: UnboundedSender<Frame>,
    outbound: UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Sends a text frame to the bridge.
    pub fn send(&self, text: &str) {
        self.send_frame(Frame::Text(text.to_owned()));
    }

    /// Sends any frame to the bridge.
    pub fn send_frame(&self, frame: Frame) {
        self.inbound.send(frame).expect("bridge side dropped");
    }

    /// Waits for the next frame the bridge sent, parsed as JSON.
    pub async fn receive(&mut self) -> Value {
        let text = tokio::time::timeout(Duration::from_secs(2), self.outbound.recv())
            .await
            .expect("no frame within two seconds")
            .expect("bridge side dropped");
        serde_json::from_str(&text).expect("bridge sent invalid JSON")
    }

    /// Returns a frame the bridge already sent, if any.
    pub fn try_receive(&mut self) -> Option<Value> {
        self.outbound
            .try_recv()
            .ok()
            .map(|text| serde_json::from_str(&text).expect("bridge sent invalid JSON"))
    }
}

/// Builds a connector that yields one link, plus the controller end.
#[must_use]
pub fn memory_link() -> (MemoryConnector, MemoryPeer) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let transport = MemoryTransport {
        inbound: inbound_rx,
        outbound: outbound_tx,
        closed: false,
    };
    let connector = MemoryConnector {
        link: Mutex::new(Some(transport)),
        stall: false,
    };
    let peer = MemoryPeer {
        inbound: inbound_tx,
        outbound: outbound_rx,
    };
    (connector, peer)
}
