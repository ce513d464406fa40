//! Websocket transport built on `tokio-tungstenite`.

use std::borrow::Cow;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use super::SESSION_TARGET;
use super::transport::{Connector, Frame, Transport, TransportError};

/// Dials controllers over `ws://` and `wss://`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, address: &Url) -> Result<WebSocketTransport, TransportError> {
        let (stream, response) = connect_async(address.as_str())
            .await
            .map_err(|error| TransportError::connect(address, error))?;
        debug!(
            target: SESSION_TARGET,
            address = %address,
            status = %response.status(),
            "websocket handshake completed"
        );
        Ok(WebSocketTransport { stream })
    }
}

/// An open websocket connection.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(TransportError::send)
    }

    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(error) => return Some(Err(TransportError::receive(error))),
            };
            match message {
                Message::Text(text) => return Some(Ok(Frame::Text(text))),
                Message::Binary(bytes) => return Some(Ok(Frame::Binary(bytes))),
                Message::Close(frame) => {
                    return Some(Ok(Frame::Close(
                        frame.map(|frame| frame.reason.into_owned()),
                    )));
                }
                // Control frames are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self, reason: &str) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Cow::Owned(reason.to_owned()),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(TransportError::send)
    }
}
