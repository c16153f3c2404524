//! Session types: the client's record of who it is and which game it's in.
//!
//! A [`SessionState`] tracks:
//! - WHO we are in the current attempt (`PlayerId`)
//! - WHICH game we joined (`SessionId`)
//! - WHAT mark we play (`Side`)
//! - WHICH attempt is current (`epoch`), so late responses from an
//!   abandoned attempt can be recognized and dropped

use rand::Rng;
use xo_protocol::{PlayerId, SessionId, Side};

use crate::SessionError;

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// Identifies the attempt an in-flight request was issued for.
///
/// Every request the controller sends out carries a ticket, and every
/// resolution brings it back. If the state has been reset (surrender,
/// game over) or moved on to another session since, the ticket no longer
/// matches [`SessionState::ticket`] and the resolution is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    session_id: Option<SessionId>,
}

impl Ticket {
    /// The session the request was issued for, if one was bound.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The authoritative identity record of the client.
///
/// There is exactly one per client and it is owned by the session
/// controller; nothing else mutates it. All fields start out `None`.
///
/// ## Invariants
///
/// - `side` is set only after a ready-confirmation for the current
///   `session_id`, and at most once per game.
/// - only one session is bound at a time; binding another requires a
///   [`reset`](Self::reset) first, which also invalidates every
///   outstanding [`Ticket`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    player_id: Option<PlayerId>,
    session_id: Option<SessionId>,
    side: Option<Side>,
    epoch: u64,
}

impl SessionState {
    /// Creates an empty state (lobby, nothing joined).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// Returns `true` when no identity is held at all.
    pub fn is_empty(&self) -> bool {
        self.player_id.is_none()
            && self.session_id.is_none()
            && self.side.is_none()
    }

    /// Returns the player and session ids together, or `None` if either
    /// is missing. Turn-channel calls need both.
    pub fn credentials(&self) -> Option<(PlayerId, SessionId)> {
        match (&self.player_id, &self.session_id) {
            (Some(player), Some(session)) => {
                Some((player.clone(), session.clone()))
            }
            _ => None,
        }
    }

    /// Binds the state to `session_id` and generates a fresh player id
    /// for this attempt.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyJoined`] if a session is already
    /// bound.
    pub fn join(
        &mut self,
        session_id: SessionId,
    ) -> Result<PlayerId, SessionError> {
        if let Some(existing) = &self.session_id {
            return Err(SessionError::AlreadyJoined(existing.clone()));
        }

        let player_id = generate_player_id();
        tracing::info!(%session_id, %player_id, "joined session");

        self.player_id = Some(player_id.clone());
        self.session_id = Some(session_id);
        Ok(player_id)
    }

    /// Records the side the server assigned us.
    ///
    /// # Errors
    /// - [`SessionError::NotJoined`] — no session is bound
    /// - [`SessionError::SideAlreadyAssigned`] — a side is already set
    pub fn assign_side(&mut self, side: Side) -> Result<(), SessionError> {
        let session_id =
            self.session_id.as_ref().ok_or(SessionError::NotJoined)?;
        if self.side.is_some() {
            return Err(SessionError::SideAlreadyAssigned(session_id.clone()));
        }
        tracing::info!(%session_id, %side, "side assigned");
        self.side = Some(side);
        Ok(())
    }

    /// Clears every field and starts a new epoch, so any request issued
    /// before the reset resolves as stale.
    pub fn reset(&mut self) {
        self.player_id = None;
        self.session_id = None;
        self.side = None;
        self.epoch += 1;
    }

    /// Returns the ticket for a request issued right now.
    pub fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            session_id: self.session_id.clone(),
        }
    }

    /// Returns `true` if `ticket` was issued for the current attempt and
    /// session.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.session_id == self.session_id
    }
}

/// Generates a random 32-character hex player id (128 bits of entropy).
fn generate_player_id() -> PlayerId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    PlayerId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// =========================================================================
// Tests
// =========================================================================
