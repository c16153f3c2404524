//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Both channels go through the same [`Codec`]: the push channel decodes
//! WebSocket frames with it and the turn channel encodes request bodies
//! and decodes responses with it.
//!
//! The server speaks JSON, so [`JsonCodec`] is the only implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between the event loop and the tasks
///   it spawns for in-flight requests.
/// - `'static` → the codec owns everything it needs, so it can live in a
///   long-running reader task.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the receive buffer can be dropped as
/// soon as decoding finishes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// The `Content-Type` to advertise for encoded bodies.
    fn content_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use xo_protocol::{Codec, JsonCodec, LobbyMessage, SessionId};
///
/// let codec = JsonCodec;
///
/// let msg: LobbyMessage = codec
///     .decode(br#"{"action": "startGame", "id": "G1"}"#)
///     .unwrap();
/// assert_eq!(msg, LobbyMessage::StartGame { id: SessionId::from("G1") });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
