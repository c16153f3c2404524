//! Client session state for xo.
//!
//! This crate holds the two pieces of data the session controller owns:
//!
//! 1. **Identity** — who we are and which game we're in ([`SessionState`])
//! 2. **Phase** — where we are in the game lifecycle ([`Phase`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Controller (above)  ← the only writer of SessionState and Phase
//!     ↕
//! Session Layer (this crate)  ← identity, side, attempt tickets
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, SessionId, Side
//! ```

mod error;
mod phase;
mod session;

pub use error::SessionError;
pub use phase::Phase;
pub use session::{SessionState, Ticket};
