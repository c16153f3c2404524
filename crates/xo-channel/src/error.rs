//! Error types for the channel layer.

use xo_protocol::ProtocolError;
use xo_transport::TransportError;

/// Errors from a turn-channel request.
///
/// The controller decides what each variant means for the game:
/// [`NoOpponentTimeout`](Self::NoOpponentTimeout) gets its own message,
/// [`Rejected`](Self::Rejected) keeps the player on turn, and any error on
/// a long-poll is retried.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The request never produced a response (connect failure, reset,
    /// client-side timeout).
    #[error("transport failure: {0}")]
    Transport(#[source] std::io::Error),

    /// The server answered with an unexpected status code.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The server refused a move. Carries the server's explanation.
    #[error("move rejected: {0}")]
    Rejected(String),

    /// Nobody accepted the game within the server's ready window.
    #[error("no answer from another player")]
    NoOpponentTimeout,

    /// The response body could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors from the push channel's outgoing side.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The underlying connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The registration could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
