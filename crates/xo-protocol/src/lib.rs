//! Wire protocol for xo.
//!
//! This crate defines the "language" the client speaks with the game
//! server over its two channels:
//!
//! - **Push types** ([`LobbyMessage`], [`Registration`]) — JSON records on
//!   the WebSocket lobby channel.
//! - **Turn types** ([`ReadyRequest`], [`MoveRequest`], [`OpponentMove`],
//!   etc.) — JSON bodies on the HTTP request/response channel.
//! - **Identity types** ([`PlayerId`], [`SessionId`], [`Side`],
//!   [`Position`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between the transports (raw bytes) and the
//! session layer. It doesn't know about connections or game phases. It
//! only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (LobbyMessage, OpponentMove, ...) → Controller
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ErrorResponse, GAME_ID_HEADER, LobbyMessage, MoveAccepted, MoveRequest,
    NewGameResponse, OpponentMove, PLAYER_ID_HEADER, PlayerId, Position,
    ReadyRequest, ReadyResponse, Registration, SessionId, Side,
};
