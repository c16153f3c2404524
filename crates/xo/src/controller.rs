//! The session controller: the single arbiter of game state.
//!
//! The controller never touches a socket. It consumes [`ClientEvent`]s one
//! at a time and answers each with a list of [`Effect`]s for the driver to
//! carry out: presenter intents, push registrations, and turn-channel
//! requests. Results of those requests come back later as
//! [`ClientEvent::Turn`], tagged with the [`Ticket`] they were issued
//! under, so anything that resolves after the game moved on is dropped.
//!
//! ```text
//!          UiEvent ─┐
//!        PushEvent ─┼─→ SessionController::handle ─→ Vec<Effect>
//!   TurnResolution ─┘          │
//!                       SessionState + Phase
//! ```

use xo_channel::{PushEvent, TurnError};
use xo_protocol::{MoveAccepted, OpponentMove, PlayerId, Position, SessionId, Side};
use xo_session::{Phase, SessionState, Ticket};

use crate::presenter::{Intent, UiEvent};

const NO_OPPONENT_MESSAGE: &str =
    "Error when starting game: no answer from another player";
const READY_FAILED_MESSAGE: &str = "Unknown error when starting game";
const CREATE_FAILED_MESSAGE: &str = "Error when creating game";

// ---------------------------------------------------------------------------
// Events in, effects out
// ---------------------------------------------------------------------------

/// One entry in the client's event queue.
#[derive(Debug)]
pub enum ClientEvent {
    Ui(UiEvent),
    Push(PushEvent),
    Turn(TurnResolution),
    /// Stops the event loop.
    Shutdown,
}

impl From<UiEvent> for ClientEvent {
    fn from(event: UiEvent) -> Self {
        Self::Ui(event)
    }
}

impl From<PushEvent> for ClientEvent {
    fn from(event: PushEvent) -> Self {
        Self::Push(event)
    }
}

/// A turn-channel call the driver should make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest {
    CreateSession,
    ConfirmReady {
        player: PlayerId,
        session: SessionId,
    },
    SubmitMove {
        position: Position,
        player: PlayerId,
        session: SessionId,
    },
    /// `attempt` is 0 for the first poll of a turn and counts re-issues
    /// after failures.
    PollOpponentMove {
        player: PlayerId,
        session: SessionId,
        attempt: u32,
    },
    Surrender {
        player: PlayerId,
        session: SessionId,
    },
}

/// The result of a [`TurnRequest`], one variant per request kind.
#[derive(Debug)]
pub enum TurnOutcome {
    SessionCreated(Result<SessionId, TurnError>),
    Ready(Result<Side, TurnError>),
    MoveSubmitted {
        position: Position,
        result: Result<MoveAccepted, TurnError>,
    },
    OpponentMoved {
        attempt: u32,
        result: Result<OpponentMove, TurnError>,
    },
    Surrendered(Result<(), TurnError>),
}

/// A [`TurnOutcome`] together with the ticket its request was issued
/// under.
#[derive(Debug)]
pub struct TurnResolution {
    pub ticket: Ticket,
    pub outcome: TurnOutcome,
}

/// Work the driver performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Present(Intent),
    /// Register for the session's start notification on the push channel.
    Register(SessionId),
    Request(Ticket, TurnRequest),
}

/// What the controller is currently waiting on during a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Move(Position),
    Poll,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives one client through lobby, game, and back.
///
/// Owns the [`SessionState`] and the current [`Phase`]; nothing else
/// writes to them. At most one move submission or poll is outstanding at
/// any time.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    phase: Phase,
    in_flight: Option<InFlight>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::new(),
            phase: Phase::Lobby,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Effects for the initial screen.
    pub fn start(&self) -> Vec<Effect> {
        vec![
            Effect::Present(Intent::ShowLobby),
            Effect::Present(Intent::SetCreateGameEnabled(true)),
        ]
    }

    /// Processes one event to completion.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<Effect> {
        let mut out = Vec::new();
        match event {
            ClientEvent::Ui(ui) => self.on_ui(ui, &mut out),
            ClientEvent::Push(push) => self.on_push(push, &mut out),
            ClientEvent::Turn(resolution) => self.on_turn(resolution, &mut out),
            ClientEvent::Shutdown => {}
        }
        out
    }

    // -- UI ----------------------------------------------------------------

    fn on_ui(&mut self, event: UiEvent, out: &mut Vec<Effect>) {
        match event {
            UiEvent::CreateGame => {
                match self.phase {
                    Phase::Lobby => {}
                    // No GameStart yet: the attempt is abandoned, not surrendered.
                    Phase::Joining => {
                        tracing::info!(
                            session_id = ?self.state.session_id(),
                            "abandoning unstarted session for a new game"
                        );
                        self.abandon_attempt();
                    }
                    _ => {
                        tracing::debug!(phase = %self.phase, "create game ignored during a game");
                        return;
                    }
                }
                out.push(Effect::Present(Intent::SetCreateGameEnabled(false)));
                self.enter(Phase::Joining);
                out.push(Effect::Request(
                    self.state.ticket(),
                    TurnRequest::CreateSession,
                ));
            }
            UiEvent::SelectLobbyEntry(id) => {
                if self.phase != Phase::Lobby {
                    tracing::debug!(phase = %self.phase, %id, "lobby entry ignored outside lobby");
                    return;
                }
                if let Err(e) = self.state.join(id.clone()) {
                    tracing::warn!(error = %e, "cannot join selected session");
                    return;
                }
                out.push(Effect::Present(Intent::SetCreateGameEnabled(false)));
                self.enter(Phase::Joining);
                out.push(Effect::Register(id));
            }
            UiEvent::CellClicked(position) => {
                if self.phase != Phase::MyTurn {
                    tracing::debug!(phase = %self.phase, %position, "click ignored off turn");
                    return;
                }
                if let Some(pending) = self.in_flight {
                    tracing::debug!(?pending, %position, "click ignored, request in flight");
                    return;
                }
                let Some((player, session)) = self.state.credentials() else {
                    tracing::warn!("in game without credentials");
                    return;
                };
                self.in_flight = Some(InFlight::Move(position));
                out.push(Effect::Request(
                    self.state.ticket(),
                    TurnRequest::SubmitMove {
                        position,
                        player,
                        session,
                    },
                ));
            }
            UiEvent::Surrender => {
                if !self.phase.is_active() {
                    tracing::debug!(phase = %self.phase, "surrender ignored, no game");
                    return;
                }
                // Before create_session resolves there is nothing to tell
                // the server.
                if let Some((player, session)) = self.state.credentials() {
                    tracing::info!(%session, "surrendering");
                    out.push(Effect::Request(
                        self.state.ticket(),
                        TurnRequest::Surrender { player, session },
                    ));
                }
                self.return_to_lobby(out);
            }
        }
    }

    // -- Push --------------------------------------------------------------

    fn on_push(&mut self, event: PushEvent, out: &mut Vec<Effect>) {
        match event {
            PushEvent::LobbyAdd(id) => {
                out.push(Effect::Present(Intent::AddLobbyEntry(id)))
            }
            PushEvent::LobbyRemove(id) => {
                out.push(Effect::Present(Intent::RemoveLobbyEntry(id)))
            }
            PushEvent::GameStart(id) => {
                let matches = self.state.session_id() == Some(&id);
                if self.phase != Phase::Joining || !matches {
                    tracing::debug!(phase = %self.phase, %id, "game start ignored");
                    return;
                }
                let Some((player, session)) = self.state.credentials() else {
                    return;
                };
                self.enter(Phase::AwaitingReady);
                out.push(Effect::Present(Intent::ShowGameBoard));
                out.push(Effect::Request(
                    self.state.ticket(),
                    TurnRequest::ConfirmReady { player, session },
                ));
            }
            PushEvent::Opened => tracing::info!("push channel established"),
            PushEvent::Closed {
                clean,
                code,
                reason,
            } => {
                if clean {
                    tracing::info!(code, %reason, "push channel closed");
                } else {
                    tracing::warn!(code, %reason, "push channel terminated");
                }
            }
            PushEvent::Error(message) => {
                tracing::warn!(%message, "push channel error");
                out.push(Effect::Present(Intent::SetCreateGameEnabled(true)));
            }
        }
    }

    // -- Turn results ------------------------------------------------------

    fn on_turn(&mut self, resolution: TurnResolution, out: &mut Vec<Effect>) {
        let TurnResolution { ticket, outcome } = resolution;

        // The state was reset when the surrender went out, so its
        // acknowledgement is always stale. Log it anyway.
        if let TurnOutcome::Surrendered(result) = &outcome {
            match result {
                Ok(()) => tracing::info!(session = ?ticket.session_id(), "surrender acknowledged"),
                Err(e) => tracing::warn!(session = ?ticket.session_id(), error = %e, "surrender failed"),
            }
            return;
        }

        if !self.state.is_current(&ticket) {
            tracing::debug!(?ticket, ?outcome, "dropping stale resolution");
            return;
        }

        match outcome {
            TurnOutcome::SessionCreated(result) => {
                self.on_session_created(result, out)
            }
            TurnOutcome::Ready(result) => self.on_ready(result, out),
            TurnOutcome::MoveSubmitted { position, result } => {
                self.on_move_submitted(position, result, out)
            }
            TurnOutcome::OpponentMoved { attempt, result } => {
                self.on_opponent_moved(attempt, result, out)
            }
            TurnOutcome::Surrendered(_) => {}
        }
    }

    fn on_session_created(
        &mut self,
        result: Result<SessionId, TurnError>,
        out: &mut Vec<Effect>,
    ) {
        if self.phase != Phase::Joining {
            return;
        }
        match result {
            Ok(id) => match self.state.join(id.clone()) {
                Ok(_) => out.push(Effect::Register(id)),
                Err(e) => {
                    tracing::warn!(error = %e, "cannot bind created session");
                    self.return_to_lobby(out);
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "create session failed");
                out.push(Effect::Present(Intent::ReportError(format!(
                    "{CREATE_FAILED_MESSAGE}: {e}"
                ))));
                self.return_to_lobby(out);
            }
        }
    }

    fn on_ready(&mut self, result: Result<Side, TurnError>, out: &mut Vec<Effect>) {
        if self.phase != Phase::AwaitingReady {
            return;
        }
        let side = match result {
            Ok(side) => side,
            Err(e) => {
                tracing::warn!(session = ?self.state.session_id(), error = %e, "ready failed");
                let message = match e {
                    TurnError::NoOpponentTimeout => NO_OPPONENT_MESSAGE,
                    _ => READY_FAILED_MESSAGE,
                };
                out.push(Effect::Present(Intent::ReportError(message.to_owned())));
                self.return_to_lobby(out);
                return;
            }
        };

        if let Err(e) = self.state.assign_side(side) {
            tracing::warn!(error = %e, "ignoring ready confirmation");
            return;
        }
        out.push(Effect::Present(Intent::RenderBoard { side }));
        if side.moves_first() {
            self.enter(Phase::MyTurn);
        } else {
            self.enter(Phase::OpponentTurn);
            self.issue_poll(0, out);
        }
    }

    fn on_move_submitted(
        &mut self,
        position: Position,
        result: Result<MoveAccepted, TurnError>,
        out: &mut Vec<Effect>,
    ) {
        if self.phase != Phase::MyTurn
            || self.in_flight != Some(InFlight::Move(position))
        {
            return;
        }
        self.in_flight = None;

        let accepted = match result {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::info!(%position, error = %e, "move not accepted");
                let message = match e {
                    TurnError::Rejected(message) => message,
                    other => other.to_string(),
                };
                out.push(Effect::Present(Intent::ReportError(message)));
                return;
            }
        };

        let Some(side) = self.state.side() else {
            return;
        };
        out.push(Effect::Present(Intent::RenderMove { position, side }));
        match accepted.win {
            Some(win) => self.finish(win, out),
            None => {
                self.enter(Phase::OpponentTurn);
                self.issue_poll(0, out);
            }
        }
    }

    fn on_opponent_moved(
        &mut self,
        attempt: u32,
        result: Result<OpponentMove, TurnError>,
        out: &mut Vec<Effect>,
    ) {
        if self.phase != Phase::OpponentTurn || self.in_flight != Some(InFlight::Poll) {
            return;
        }
        self.in_flight = None;

        let moved = match result {
            Ok(moved) => moved,
            Err(e) => {
                tracing::warn!(attempt, error = %e, "poll failed, re-issuing");
                self.issue_poll(attempt.saturating_add(1), out);
                return;
            }
        };

        let Some(side) = self.state.side() else {
            return;
        };
        out.push(Effect::Present(Intent::RenderMove {
            position: moved.position,
            side: side.opponent(),
        }));
        match moved.win {
            Some(win) => self.finish(win, out),
            None => self.enter(Phase::MyTurn),
        }
    }

    // -- Helpers -----------------------------------------------------------

    fn enter(&mut self, next: Phase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(from = %self.phase, to = %next, "unexpected phase transition");
        }
        tracing::info!(
            from = %self.phase,
            to = %next,
            session = ?self.state.session_id(),
            "phase transition"
        );
        self.phase = next;
    }

    fn issue_poll(&mut self, attempt: u32, out: &mut Vec<Effect>) {
        let Some((player, session)) = self.state.credentials() else {
            return;
        };
        self.in_flight = Some(InFlight::Poll);
        out.push(Effect::Request(
            self.state.ticket(),
            TurnRequest::PollOpponentMove {
                player,
                session,
                attempt,
            },
        ));
    }

    fn finish(&mut self, win: String, out: &mut Vec<Effect>) {
        self.enter(Phase::GameOver);
        out.push(Effect::Present(Intent::ReportWinner(win)));
        self.return_to_lobby(out);
    }

    fn return_to_lobby(&mut self, out: &mut Vec<Effect>) {
        self.abandon_attempt();
        out.push(Effect::Present(Intent::ShowLobby));
        out.push(Effect::Present(Intent::SetCreateGameEnabled(true)));
    }

    /// Drops the session and anything in flight for it.
    fn abandon_attempt(&mut self) {
        self.state.reset();
        self.in_flight = None;
        self.enter(Phase::Lobby);
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: &str) -> SessionId {
        SessionId::from(id)
    }

    fn io_error() -> TurnError {
        TurnError::Transport(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))
    }

    /// Returns the ticket and request of every `Request` effect.
    fn requests(effects: &[Effect]) -> Vec<(Ticket, TurnRequest)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Request(ticket, req) => Some((ticket.clone(), req.clone())),
                _ => None,
            })
            .collect()
    }

    fn intents(effects: &[Effect]) -> Vec<Intent> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Present(intent) => Some(intent.clone()),
                _ => None,
            })
            .collect()
    }

    fn polls(effects: &[Effect]) -> Vec<u32> {
        requests(effects)
            .into_iter()
            .filter_map(|(_, req)| match req {
                TurnRequest::PollOpponentMove { attempt, .. } => Some(attempt),
                _ => None,
            })
            .collect()
    }

    fn resolve(ticket: Ticket, outcome: TurnOutcome) -> ClientEvent {
        ClientEvent::Turn(TurnResolution { ticket, outcome })
    }

    /// Drives a controller through join + game start; returns it with the
    /// ticket of the pending ready request.
    fn awaiting_ready() -> (SessionController, Ticket) {
        let mut ctl = SessionController::new();
        ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G1"))));
        let effects = ctl.handle(ClientEvent::Push(PushEvent::GameStart(sid("G1"))));
        let (ticket, req) = requests(&effects).remove(0);
        assert!(matches!(req, TurnRequest::ConfirmReady { .. }));
        (ctl, ticket)
    }

    /// A controller in `MyTurn` as side X.
    fn my_turn() -> (SessionController, Ticket) {
        let (mut ctl, ticket) = awaiting_ready();
        ctl.handle(resolve(ticket.clone(), TurnOutcome::Ready(Ok(Side::X))));
        assert_eq!(ctl.phase(), Phase::MyTurn);
        (ctl, ticket)
    }

    /// A controller in `OpponentTurn` as side O with one poll in flight.
    fn opponent_turn() -> (SessionController, Ticket) {
        let (mut ctl, ticket) = awaiting_ready();
        ctl.handle(resolve(ticket.clone(), TurnOutcome::Ready(Ok(Side::O))));
        assert_eq!(ctl.phase(), Phase::OpponentTurn);
        (ctl, ticket)
    }

    fn click(ctl: &mut SessionController, n: u16) -> Vec<Effect> {
        ctl.handle(ClientEvent::Ui(UiEvent::CellClicked(Position(n))))
    }

    // =====================================================================
    // Lobby
    // =====================================================================

    #[test]
    fn test_start_shows_lobby_with_create_enabled() {
        let ctl = SessionController::new();
        assert_eq!(
            intents(&ctl.start()),
            [Intent::ShowLobby, Intent::SetCreateGameEnabled(true)]
        );
    }

    #[test]
    fn test_handle_lobby_updates_never_touch_state() {
        let mut ctl = SessionController::new();

        let mut shown = Vec::new();
        for event in [
            PushEvent::LobbyAdd(sid("A")),
            PushEvent::LobbyAdd(sid("B")),
            PushEvent::LobbyRemove(sid("A")),
            PushEvent::LobbyRemove(sid("ghost")),
        ] {
            shown.extend(intents(&ctl.handle(ClientEvent::Push(event))));
        }

        assert!(ctl.state().is_empty());
        assert_eq!(ctl.phase(), Phase::Lobby);
        assert_eq!(
            shown,
            [
                Intent::AddLobbyEntry(sid("A")),
                Intent::AddLobbyEntry(sid("B")),
                Intent::RemoveLobbyEntry(sid("A")),
                Intent::RemoveLobbyEntry(sid("ghost")),
            ]
        );
    }

    #[test]
    fn test_handle_lobby_updates_forwarded_mid_game() {
        let (mut ctl, _) = my_turn();

        let effects = ctl.handle(ClientEvent::Push(PushEvent::LobbyAdd(sid("Z"))));

        assert_eq!(intents(&effects), [Intent::AddLobbyEntry(sid("Z"))]);
        assert_eq!(ctl.phase(), Phase::MyTurn);
    }

    #[test]
    fn test_create_game_requests_session_and_disables_button() {
        let mut ctl = SessionController::new();

        let effects = ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));

        assert_eq!(ctl.phase(), Phase::Joining);
        assert_eq!(intents(&effects), [Intent::SetCreateGameEnabled(false)]);
        let reqs = requests(&effects);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].1, TurnRequest::CreateSession);
    }

    #[test]
    fn test_session_created_joins_and_registers() {
        let mut ctl = SessionController::new();
        let effects = ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));
        let (ticket, _) = requests(&effects).remove(0);

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::SessionCreated(Ok(sid("G1"))),
        ));

        assert_eq!(effects, [Effect::Register(sid("G1"))]);
        assert_eq!(ctl.state().session_id(), Some(&sid("G1")));
        assert!(ctl.state().player_id().is_some());
        assert_eq!(ctl.phase(), Phase::Joining);
    }

    #[test]
    fn test_session_create_failure_reports_and_returns_to_lobby() {
        let mut ctl = SessionController::new();
        let effects = ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));
        let (ticket, _) = requests(&effects).remove(0);

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::SessionCreated(Err(TurnError::Status(500))),
        ));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
        let shown = intents(&effects);
        assert!(matches!(&shown[0], Intent::ReportError(m) if m.starts_with("Error when creating game")));
        assert!(shown.contains(&Intent::SetCreateGameEnabled(true)));
    }

    #[test]
    fn test_select_lobby_entry_joins_and_registers_without_request() {
        let mut ctl = SessionController::new();

        let effects = ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G7"))));

        assert!(requests(&effects).is_empty());
        assert!(effects.contains(&Effect::Register(sid("G7"))));
        assert_eq!(ctl.state().session_id(), Some(&sid("G7")));
        assert_eq!(ctl.phase(), Phase::Joining);
    }

    #[test]
    fn test_lobby_clicks_outside_lobby_are_ignored() {
        let (mut ctl, _) = my_turn();

        assert!(ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G2")))).is_empty());
        assert!(ctl.handle(ClientEvent::Ui(UiEvent::CreateGame)).is_empty());
        assert_eq!(ctl.state().session_id(), Some(&sid("G1")));
        assert_eq!(ctl.phase(), Phase::MyTurn);
    }

    // =====================================================================
    // Game start + ready
    // =====================================================================

    #[test]
    fn test_game_start_for_other_session_is_ignored() {
        let mut ctl = SessionController::new();
        ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G1"))));
        let before = ctl.state().clone();

        let effects = ctl.handle(ClientEvent::Push(PushEvent::GameStart(sid("G2"))));

        assert!(effects.is_empty());
        assert_eq!(ctl.phase(), Phase::Joining);
        assert_eq!(ctl.state().session_id(), before.session_id());
        assert_eq!(ctl.state().player_id(), before.player_id());
    }

    #[test]
    fn test_game_start_in_lobby_is_ignored() {
        let mut ctl = SessionController::new();

        let effects = ctl.handle(ClientEvent::Push(PushEvent::GameStart(sid("G1"))));

        assert!(effects.is_empty());
        assert!(ctl.state().is_empty());
        assert_eq!(ctl.phase(), Phase::Lobby);
    }

    #[test]
    fn test_game_start_shows_board_and_confirms_ready() {
        let mut ctl = SessionController::new();
        ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G1"))));

        let effects = ctl.handle(ClientEvent::Push(PushEvent::GameStart(sid("G1"))));

        assert_eq!(ctl.phase(), Phase::AwaitingReady);
        assert_eq!(intents(&effects), [Intent::ShowGameBoard]);
        let (_, req) = requests(&effects).remove(0);
        let player = ctl.state().player_id().cloned().unwrap();
        assert_eq!(
            req,
            TurnRequest::ConfirmReady {
                player,
                session: sid("G1")
            }
        );
    }

    #[test]
    fn test_ready_as_x_takes_turn_without_polling() {
        let (mut ctl, ticket) = awaiting_ready();

        let effects = ctl.handle(resolve(ticket, TurnOutcome::Ready(Ok(Side::X))));

        assert_eq!(ctl.phase(), Phase::MyTurn);
        assert_eq!(ctl.state().side(), Some(Side::X));
        assert_eq!(intents(&effects), [Intent::RenderBoard { side: Side::X }]);
        assert!(requests(&effects).is_empty());
    }

    #[test]
    fn test_ready_as_o_issues_exactly_one_poll() {
        let (mut ctl, ticket) = awaiting_ready();

        let effects = ctl.handle(resolve(ticket, TurnOutcome::Ready(Ok(Side::O))));

        assert_eq!(ctl.phase(), Phase::OpponentTurn);
        assert_eq!(polls(&effects), [0]);
        assert_eq!(requests(&effects).len(), 1);
    }

    #[test]
    fn test_ready_no_opponent_reports_specific_message_and_resets() {
        let (mut ctl, ticket) = awaiting_ready();

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::Ready(Err(TurnError::NoOpponentTimeout)),
        ));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
        assert!(requests(&effects).is_empty());
        assert_eq!(
            intents(&effects),
            [
                Intent::ReportError(
                    "Error when starting game: no answer from another player".into()
                ),
                Intent::ShowLobby,
                Intent::SetCreateGameEnabled(true),
            ]
        );
    }

    #[test]
    fn test_ready_other_failure_reports_unknown_error() {
        let (mut ctl, ticket) = awaiting_ready();

        let effects = ctl.handle(resolve(ticket, TurnOutcome::Ready(Err(io_error()))));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert_eq!(
            intents(&effects)[0],
            Intent::ReportError("Unknown error when starting game".into())
        );
    }

    // =====================================================================
    // Moves
    // =====================================================================

    #[test]
    fn test_click_in_my_turn_submits_move() {
        let (mut ctl, _) = my_turn();

        let effects = click(&mut ctl, 5);

        let (_, req) = requests(&effects).remove(0);
        assert!(matches!(req, TurnRequest::SubmitMove { position: Position(5), .. }));
    }

    #[test]
    fn test_duplicate_click_while_move_in_flight_is_ignored() {
        let (mut ctl, _) = my_turn();
        click(&mut ctl, 5);

        assert!(click(&mut ctl, 5).is_empty());
        assert!(click(&mut ctl, 6).is_empty());
    }

    #[test]
    fn test_click_off_turn_is_ignored() {
        let (mut ctl, _) = opponent_turn();

        assert!(click(&mut ctl, 5).is_empty());
        assert_eq!(ctl.phase(), Phase::OpponentTurn);
    }

    #[test]
    fn test_rejected_move_keeps_turn_and_state() {
        let (mut ctl, _) = my_turn();
        let effects = click(&mut ctl, 5);
        let (ticket, _) = requests(&effects).remove(0);
        let before = ctl.state().clone();

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::MoveSubmitted {
                position: Position(5),
                result: Err(TurnError::Rejected("Cell is taken".into())),
            },
        ));

        assert_eq!(intents(&effects), [Intent::ReportError("Cell is taken".into())]);
        assert_eq!(ctl.phase(), Phase::MyTurn);
        assert_eq!(ctl.state().side(), before.side());
        assert_eq!(ctl.state().session_id(), before.session_id());
        assert_eq!(ctl.state().player_id(), before.player_id());
        // The turn is still ours: another click goes out.
        assert_eq!(requests(&click(&mut ctl, 6)).len(), 1);
    }

    #[test]
    fn test_accepted_move_renders_and_polls() {
        let (mut ctl, _) = my_turn();
        let (ticket, _) = requests(&click(&mut ctl, 5)).remove(0);

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::MoveSubmitted {
                position: Position(5),
                result: Ok(MoveAccepted::default()),
            },
        ));

        assert_eq!(
            intents(&effects),
            [Intent::RenderMove {
                position: Position(5),
                side: Side::X
            }]
        );
        assert_eq!(ctl.phase(), Phase::OpponentTurn);
        assert_eq!(polls(&effects), [0]);
    }

    #[test]
    fn test_winning_move_reports_winner_and_resets() {
        let (mut ctl, _) = my_turn();
        let (ticket, _) = requests(&click(&mut ctl, 5)).remove(0);

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::MoveSubmitted {
                position: Position(5),
                result: Ok(MoveAccepted {
                    win: Some("x wins".into()),
                }),
            },
        ));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
        assert!(requests(&effects).is_empty());
        assert_eq!(
            intents(&effects),
            [
                Intent::RenderMove {
                    position: Position(5),
                    side: Side::X
                },
                Intent::ReportWinner("x wins".into()),
                Intent::ShowLobby,
                Intent::SetCreateGameEnabled(true),
            ]
        );
    }

    // =====================================================================
    // Polling
    // =====================================================================

    #[test]
    fn test_poll_failure_reissues_one_poll_silently() {
        let (mut ctl, ticket) = opponent_turn();

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::OpponentMoved {
                attempt: 0,
                result: Err(io_error()),
            },
        ));

        assert!(intents(&effects).is_empty());
        assert_eq!(polls(&effects), [1]);
        assert_eq!(requests(&effects).len(), 1);
        assert_eq!(ctl.phase(), Phase::OpponentTurn);
    }

    #[test]
    fn test_opponent_move_renders_with_opposite_side_and_hands_turn() {
        let (mut ctl, ticket) = opponent_turn();

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::OpponentMoved {
                attempt: 0,
                result: Ok(OpponentMove {
                    position: Position(44),
                    win: None,
                }),
            },
        ));

        assert_eq!(
            intents(&effects),
            [Intent::RenderMove {
                position: Position(44),
                side: Side::X
            }]
        );
        assert_eq!(ctl.phase(), Phase::MyTurn);
        assert!(requests(&effects).is_empty());
    }

    #[test]
    fn test_opponent_winning_move_resets_to_lobby() {
        let (mut ctl, ticket) = opponent_turn();

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::OpponentMoved {
                attempt: 3,
                result: Ok(OpponentMove {
                    position: Position(7),
                    win: Some("x wins".into()),
                }),
            },
        ));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
        assert!(intents(&effects).contains(&Intent::ReportWinner("x wins".into())));
    }

    // =====================================================================
    // Surrender + stale resolutions
    // =====================================================================

    #[test]
    fn test_surrender_requests_and_resets_immediately() {
        let (mut ctl, _) = my_turn();
        let player = ctl.state().player_id().cloned().unwrap();

        let effects = ctl.handle(ClientEvent::Ui(UiEvent::Surrender));

        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
        let (_, req) = requests(&effects).remove(0);
        assert_eq!(
            req,
            TurnRequest::Surrender {
                player,
                session: sid("G1")
            }
        );
        assert!(intents(&effects).contains(&Intent::ShowLobby));
    }

    #[test]
    fn test_surrender_before_session_created_sends_nothing() {
        let mut ctl = SessionController::new();
        ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));

        let effects = ctl.handle(ClientEvent::Ui(UiEvent::Surrender));

        assert!(requests(&effects).is_empty());
        assert_eq!(ctl.phase(), Phase::Lobby);
    }

    #[test]
    fn test_surrender_in_lobby_is_ignored() {
        let mut ctl = SessionController::new();
        assert!(ctl.handle(ClientEvent::Ui(UiEvent::Surrender)).is_empty());
    }

    #[test]
    fn test_resolution_after_surrender_is_dropped() {
        let (mut ctl, ticket) = opponent_turn();
        ctl.handle(ClientEvent::Ui(UiEvent::Surrender));

        let effects = ctl.handle(resolve(
            ticket,
            TurnOutcome::OpponentMoved {
                attempt: 0,
                result: Ok(OpponentMove {
                    position: Position(9),
                    win: None,
                }),
            },
        ));

        assert!(effects.is_empty());
        assert_eq!(ctl.phase(), Phase::Lobby);
        assert!(ctl.state().is_empty());
    }

    #[test]
    fn test_stale_create_result_does_not_bind_new_attempt() {
        let mut ctl = SessionController::new();
        let (old, _) = requests(&ctl.handle(ClientEvent::Ui(UiEvent::CreateGame))).remove(0);
        ctl.handle(ClientEvent::Ui(UiEvent::Surrender));
        ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));

        let effects = ctl.handle(resolve(old, TurnOutcome::SessionCreated(Ok(sid("OLD")))));

        assert!(effects.is_empty());
        assert!(ctl.state().session_id().is_none());
    }

    #[test]
    fn test_surrender_ack_is_only_logged() {
        let (mut ctl, ticket) = my_turn();
        ctl.handle(ClientEvent::Ui(UiEvent::Surrender));

        let effects = ctl.handle(resolve(ticket, TurnOutcome::Surrendered(Ok(()))));

        assert!(effects.is_empty());
    }

    // =====================================================================
    // Push lifecycle
    // =====================================================================

    #[test]
    fn test_push_error_reenables_create_without_touching_state() {
        let (mut ctl, _) = my_turn();
        let before = ctl.state().clone();

        let effects = ctl.handle(ClientEvent::Push(PushEvent::Error("boom".into())));

        assert_eq!(intents(&effects), [Intent::SetCreateGameEnabled(true)]);
        assert_eq!(ctl.phase(), Phase::MyTurn);
        assert_eq!(ctl.state().session_id(), before.session_id());
        assert_eq!(ctl.state().side(), before.side());
    }

    #[test]
    fn test_create_game_after_push_error_abandons_unstarted_join() {
        let mut ctl = SessionController::new();
        ctl.handle(ClientEvent::Ui(UiEvent::SelectLobbyEntry(sid("G1"))));
        ctl.handle(ClientEvent::Push(PushEvent::Error("boom".into())));

        let effects = ctl.handle(ClientEvent::Ui(UiEvent::CreateGame));

        assert_eq!(intents(&effects), [Intent::SetCreateGameEnabled(false)]);
        let reqs = requests(&effects);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].1, TurnRequest::CreateSession);
        assert_eq!(ctl.phase(), Phase::Joining);
        assert!(ctl.state().is_empty());

        // The old session's start no longer applies.
        let late = ctl.handle(ClientEvent::Push(PushEvent::GameStart(sid("G1"))));
        assert!(late.is_empty());
        assert_eq!(ctl.phase(), Phase::Joining);
    }

    #[test]
    fn test_create_game_while_creating_drops_first_result() {
        let mut ctl = SessionController::new();
        let (first, _) = requests(&ctl.handle(ClientEvent::Ui(UiEvent::CreateGame))).remove(0);
        let (second, _) = requests(&ctl.handle(ClientEvent::Ui(UiEvent::CreateGame))).remove(0);

        let stale = ctl.handle(resolve(first, TurnOutcome::SessionCreated(Ok(sid("OLD")))));
        assert!(stale.is_empty());

        let effects = ctl.handle(resolve(second, TurnOutcome::SessionCreated(Ok(sid("NEW")))));
        assert_eq!(effects, [Effect::Register(sid("NEW"))]);
        assert_eq!(ctl.state().session_id(), Some(&sid("NEW")));
    }

    #[test]
    fn test_push_open_and_close_have_no_effects() {
        let mut ctl = SessionController::new();

        assert!(ctl.handle(ClientEvent::Push(PushEvent::Opened)).is_empty());
        assert!(
            ctl.handle(ClientEvent::Push(PushEvent::Closed {
                clean: true,
                code: 1000,
                reason: String::new(),
            }))
            .is_empty()
        );
    }
}
