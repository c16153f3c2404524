//! Error types for the session layer.

use xo_protocol::SessionId;

/// Errors raised when a mutation would break a [`SessionState`](crate::SessionState)
/// invariant.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The client is already bound to a session. A new attempt must reset
    /// the state first.
    #[error("already joined session {0}")]
    AlreadyJoined(SessionId),

    /// The operation needs a joined session and there is none.
    #[error("no session joined")]
    NotJoined,

    /// The side is assigned once per game; a second ready-confirmation
    /// for the same session is a protocol violation.
    #[error("side already assigned for session {0}")]
    SideAlreadyAssigned(SessionId),
}
