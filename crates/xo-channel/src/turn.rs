//! The request/response side of the game protocol.

use std::future::Future;

use xo_protocol::{MoveAccepted, OpponentMove, PlayerId, Position, SessionId, Side};

use crate::TurnError;

/// Request/response operations against the game server.
///
/// Each call is a single request. Player and session identifiers travel
/// as request metadata so the server can correlate calls.
///
/// The returned futures are `Send`: the client runs every call in its own
/// Tokio task and posts the result back to its event loop.
///
/// # Example
///
/// ```rust
/// use xo_channel::{TurnChannel, TurnError};
/// use xo_protocol::{MoveAccepted, OpponentMove, PlayerId, Position, SessionId, Side};
///
/// /// A server that always seats us first and never ends the game.
/// struct Practice;
///
/// impl TurnChannel for Practice {
///     async fn create_session(&self) -> Result<SessionId, TurnError> {
///         Ok(SessionId::from("practice"))
///     }
///     async fn confirm_ready(&self, _: &PlayerId, _: &SessionId) -> Result<Side, TurnError> {
///         Ok(Side::X)
///     }
///     async fn submit_move(
///         &self,
///         _: Position,
///         _: &PlayerId,
///         _: &SessionId,
///     ) -> Result<MoveAccepted, TurnError> {
///         Ok(MoveAccepted::default())
///     }
///     async fn poll_opponent_move(
///         &self,
///         _: &PlayerId,
///         _: &SessionId,
///     ) -> Result<OpponentMove, TurnError> {
///         Ok(OpponentMove { position: Position(1), win: None })
///     }
///     async fn surrender(&self, _: &PlayerId, _: &SessionId) -> Result<(), TurnError> {
///         Ok(())
///     }
/// }
/// ```
pub trait TurnChannel: Send + Sync + 'static {
    /// Asks the server for a new session and returns its id.
    fn create_session(
        &self,
    ) -> impl Future<Output = Result<SessionId, TurnError>> + Send;

    /// Confirms we are ready to play and returns the side we were given.
    ///
    /// # Errors
    /// [`TurnError::NoOpponentTimeout`] when the counterpart did not join
    /// within the server's window; anything else is an unknown failure.
    fn confirm_ready(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> impl Future<Output = Result<Side, TurnError>> + Send;

    /// Submits our move.
    ///
    /// # Errors
    /// [`TurnError::Rejected`] with the server's reason when the move is
    /// invalid. The turn is not consumed.
    fn submit_move(
        &self,
        position: Position,
        player: &PlayerId,
        session: &SessionId,
    ) -> impl Future<Output = Result<MoveAccepted, TurnError>> + Send;

    /// Long-polls until the opponent moves or the server's timeout elapses.
    ///
    /// Any error is transient from the caller's point of view.
    fn poll_opponent_move(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> impl Future<Output = Result<OpponentMove, TurnError>> + Send;

    /// Gives up the current game. The acknowledgement payload carries no
    /// information the client acts on.
    fn surrender(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> impl Future<Output = Result<(), TurnError>> + Send;
}
