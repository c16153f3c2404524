//! The UI boundary: what the client asks the screen to do, and what the
//! player can do back.

use xo_protocol::{Position, SessionId, Side};

/// A display instruction produced by the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ShowLobby,
    ShowGameBoard,
    /// The side is known; draw an empty board.
    RenderBoard { side: Side },
    RenderMove { position: Position, side: Side },
    ReportError(String),
    ReportWinner(String),
    AddLobbyEntry(SessionId),
    RemoveLobbyEntry(SessionId),
    SetCreateGameEnabled(bool),
}

/// Something the player did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CreateGame,
    SelectLobbyEntry(SessionId),
    Surrender,
    CellClicked(Position),
}

/// Renders the client's state.
///
/// Implementations only draw. They hold no game state and never call back
/// into the client; player input goes through a
/// [`UiHandle`](crate::UiHandle) instead.
///
/// All calls happen on the client's event loop, in the order the
/// controller produced them.
pub trait Presenter: Send + 'static {
    /// Shows the lobby and hides the game board.
    fn show_lobby(&mut self);

    /// Shows the game board in its loading state.
    fn show_game_board(&mut self);

    /// Draws an empty board once our side is known.
    fn render_board(&mut self, side: Side);

    /// Marks `position` with `side`'s sign.
    fn render_move(&mut self, position: Position, side: Side);

    fn report_error(&mut self, message: &str);

    /// Announces the end of the game. The lobby is shown right after.
    fn report_winner(&mut self, message: &str);

    fn add_lobby_entry(&mut self, id: &SessionId);

    fn remove_lobby_entry(&mut self, id: &SessionId);

    fn set_create_game_enabled(&mut self, enabled: bool);

    /// Dispatches `intent` to the matching method.
    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::ShowLobby => self.show_lobby(),
            Intent::ShowGameBoard => self.show_game_board(),
            Intent::RenderBoard { side } => self.render_board(side),
            Intent::RenderMove { position, side } => {
                self.render_move(position, side)
            }
            Intent::ReportError(message) => self.report_error(&message),
            Intent::ReportWinner(message) => self.report_winner(&message),
            Intent::AddLobbyEntry(id) => self.add_lobby_entry(&id),
            Intent::RemoveLobbyEntry(id) => self.remove_lobby_entry(&id),
            Intent::SetCreateGameEnabled(enabled) => {
                self.set_create_game_enabled(enabled)
            }
        }
    }
}
