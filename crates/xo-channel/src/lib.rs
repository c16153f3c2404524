//! Channel adapters for xo.
//!
//! The client talks to the game server over two channels, and this crate
//! wraps each behind a small API:
//!
//! - [`PushChannel`] — a long-lived connection that delivers lobby and
//!   game-start notifications as [`PushEvent`]s and carries registrations.
//! - [`TurnChannel`] — request/response operations: create a session,
//!   confirm readiness, submit a move, long-poll the opponent's move,
//!   surrender. [`HttpTurnChannel`] is the HTTP implementation.
//!
//! Neither channel knows about the other. The session controller sits
//! above both and decides what each event or result means.
//!
//! # Feature Flags
//!
//! - `http` (default) — [`HttpTurnChannel`] via `reqwest`

mod error;
#[cfg(feature = "http")]
mod http;
mod push;
mod turn;

pub use error::{ChannelError, TurnError};
#[cfg(feature = "http")]
pub use http::HttpTurnChannel;
pub use push::{PushChannel, PushEvent};
pub use turn::TurnChannel;
