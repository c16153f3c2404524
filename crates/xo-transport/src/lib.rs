//! Transport abstraction layer for xo.
//!
//! Provides the [`Connection`] trait, which abstracts over the long-lived
//! push connection the client keeps open to the lobby server. The only
//! production implementation is a WebSocket client; [`MemoryConnection`]
//! plugs a scripted in-process peer into the same trait.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket client transport via `tokio-tungstenite`

mod error;
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::{MemoryConnection, MemoryPeer};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Close handshake details reported by the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// WebSocket close code (1000 = normal closure).
    pub code: u16,
    /// Human-readable reason, possibly empty.
    pub reason: String,
}

/// One unit of inbound traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A data message (text frames are delivered as their UTF-8 bytes).
    Data(Vec<u8>),
    /// The peer completed a close handshake. No more frames follow.
    Closed(CloseInfo),
}

/// A single connection that can send and receive bytes.
///
/// The futures are `Send` so a connection can be driven from spawned
/// Tokio tasks while being shared behind an `Arc`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends data to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns [`Frame::Closed`] after a clean close handshake. A stream
    /// that ends without one is reported as an error.
    fn recv(&self) -> impl Future<Output = Result<Frame, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
