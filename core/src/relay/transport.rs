//! Relay transport seam
//!
//! A relay session needs a duplex, message-framed connection: connect, send
//! one text frame, close. The [`Transport`] / [`Connection`] pair is that
//! seam; [`WebSocketTransport`] is the production implementation.

use super::endpoint::RelayEndpoint;
use async_trait::async_trait;
use futures::SinkExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Transport-level failure at any stage of a session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("close failed: {0}")]
    Close(String),
    #[error("{0} timed out")]
    TimedOut(&'static str),
}

/// Opens connections to relays
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;

    /// Establish a connection. Callers bound this with their own deadline.
    async fn connect(&self, endpoint: &RelayEndpoint) -> Result<Self::Connection, TransportError>;
}

/// One open relay connection, owned by exactly one session
#[async_trait]
pub trait Connection: Send + 'static {
    /// Send a single outbound text frame
    async fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// WebSocket transport over `ws://` and `wss://`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

/// An open WebSocket to one relay
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    async fn connect(&self, endpoint: &RelayEndpoint) -> Result<Self::Connection, TransportError> {
        let (stream, response) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(
            relay = %endpoint,
            status = %response.status(),
            "WebSocket handshake complete"
        );

        Ok(WebSocketConnection { stream })
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}
