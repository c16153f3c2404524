//! Error types for the protocol layer.
//!
//! Each crate in xo defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization/deserialization, not
//! in networking or in the game session.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, an
    /// unknown `action` tag, or an HTML error page from a proxy.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates protocol rules, e.g. a board
    /// position of 0.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
