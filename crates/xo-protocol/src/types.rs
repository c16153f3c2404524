//! Core protocol types for xo's wire format.
//!
//! Every type here travels "on the wire": it is serialized to JSON, sent
//! to the game server, and parsed on the other side (or the reverse).
//! Field names follow the server's JSON exactly, which is why several
//! fields carry `#[serde(rename = "...")]`.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

/// Request header correlating a turn-channel call with its game.
pub const GAME_ID_HEADER: &str = "Game-ID";

/// Request header correlating a turn-channel call with its player.
pub const PLAYER_ID_HEADER: &str = "Player-ID";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque identifier for one game session.
///
/// Newtype wrapper over the server's string id, so a `SessionId` can never
/// be passed where a [`PlayerId`] is expected. `#[serde(transparent)]`
/// serializes it as the bare string: `"G1"`, not `{"0": "G1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque identifier for the local player within one session attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// The mark a player plays. `X` always moves first.
///
/// The server sends sides as lowercase strings, hence
/// `rename_all = "lowercase"`: `Side::X` ↔ `"x"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    X,
    O,
}

impl Side {
    /// Returns `true` for the side that takes the first turn.
    pub fn moves_first(self) -> bool {
        matches!(self, Self::X)
    }

    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::O => write!(f, "o"),
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A board cell, as the 1-based index the server uses.
///
/// Cells are numbered row-major starting at 1, so on a 10×10 board the
/// top-left cell is `1` and the bottom-right is `100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub u16);

impl Position {
    /// Builds the position of zero-based `(row, col)` on a board `width`
    /// cells wide.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` if `col` is not inside the
    /// row or the index does not fit a position.
    pub fn from_cell(
        row: u16,
        col: u16,
        width: u16,
    ) -> Result<Self, ProtocolError> {
        row.checked_mul(width)
            .and_then(|start| start.checked_add(col))
            .and_then(|index| index.checked_add(1))
            .filter(|_| col < width)
            .map(Self)
            .ok_or_else(|| {
                ProtocolError::InvalidMessage(format!(
                    "cell ({row}, {col}) is off a board {width} wide"
                ))
            })
    }

    /// Splits the position into zero-based `(row, col)`.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` for position 0, which the
    /// server never produces for a real cell, or for a zero `width`.
    pub fn to_cell(self, width: u16) -> Result<(u16, u16), ProtocolError> {
        if self.0 == 0 || width == 0 {
            return Err(ProtocolError::InvalidMessage(format!(
                "position {} does not name a cell",
                self.0
            )));
        }
        let index = self.0 - 1;
        Ok((index / width, index % width))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Push channel messages
// ---------------------------------------------------------------------------

/// Server → Client messages on the lobby WebSocket.
///
/// `#[serde(tag = "action")]` makes this an "internally tagged" enum, so
/// the JSON looks like `{ "action": "startGame", "id": "G1" }`.
/// `rename_all = "camelCase"` turns `StartGame` into `"startGame"` and
/// `Add` into `"add"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LobbyMessage {
    /// A session is waiting for a second player.
    Add { id: SessionId },

    /// A session left the lobby (it started or was abandoned).
    Remove { id: SessionId },

    /// Both players registered for the session; the game can begin.
    StartGame { id: SessionId },
}

/// Client → Server: "tell me when this session starts."
///
/// Serialized as `{"register": "<session id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub register: SessionId,
}

// ---------------------------------------------------------------------------
// Turn channel messages
// ---------------------------------------------------------------------------

/// Response to `POST /newGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameResponse {
    #[serde(rename = "yourId")]
    pub your_id: SessionId,
}

/// Body of `POST /gameReady`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyRequest {
    pub player: PlayerId,
    pub game: SessionId,
}

/// Response to `POST /gameReady`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub side: Side,
}

/// Body of `POST /move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub position: Position,
}

/// Successful response to `POST /move`.
///
/// `win` is present only when this move ended the game; it carries the
/// server's description of the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveAccepted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<String>,
}

/// Response to the `GET /move` long-poll: the opponent's move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentMove {
    #[serde(rename = "move")]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<String>,
}

impl OpponentMove {
    /// Rejects responses that decoded but don't name a board cell.
    pub fn validate(self) -> Result<Self, ProtocolError> {
        if self.position.0 == 0 {
            return Err(ProtocolError::InvalidMessage(
                "opponent move has position 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Error body returned with a non-success status, e.g. an invalid move.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
