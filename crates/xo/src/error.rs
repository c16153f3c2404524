//! Unified error type for the xo client.

use xo_channel::{ChannelError, TurnError};
use xo_protocol::ProtocolError;
use xo_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Turn-channel failures are normally absorbed by the session controller
/// and turned into presenter intents; they only surface here from setup
/// paths such as [`GameClientBuilder::connect`](crate::GameClientBuilder::connect).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A turn-channel request failed.
    #[error(transparent)]
    Turn(#[from] TurnError),

    /// The push channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The client's event loop is no longer running.
    #[error("client event loop has stopped")]
    Stopped,
}
