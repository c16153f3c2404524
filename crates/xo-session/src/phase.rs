//! The client's game phase state machine.

use std::fmt;

/// Where the client is in the game lifecycle.
///
/// ```text
/// Lobby → Joining → AwaitingReady → MyTurn ⇄ OpponentTurn → GameOver → Lobby
///            │            │            │           │
///            └────────────┴────────────┴───────────┴──→ Lobby (surrender / failure)
/// ```
///
/// - **Lobby**: no session joined; lobby entries are browsable.
/// - **Joining**: a session was created or picked and we registered for
///   its start notification.
/// - **AwaitingReady**: the game started; waiting for our side.
/// - **MyTurn** / **OpponentTurn**: the game is running.
/// - **GameOver**: a terminal win signal arrived. Left immediately for
///   `Lobby` once the result has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Lobby,
    Joining,
    AwaitingReady,
    MyTurn,
    OpponentTurn,
    GameOver,
}

impl Phase {
    /// Returns `true` while a session attempt is underway. Surrender is
    /// only meaningful in these phases.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Joining
                | Self::AwaitingReady
                | Self::MyTurn
                | Self::OpponentTurn
        )
    }

    /// Returns `true` if moving from `self` to `target` is a legal edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        use Phase::*;
        match (self, target) {
            (Lobby, Joining) => true,
            (Joining, AwaitingReady) => true,
            (AwaitingReady, MyTurn | OpponentTurn) => true,
            (MyTurn, OpponentTurn) | (OpponentTurn, MyTurn) => true,
            (MyTurn | OpponentTurn, GameOver) => true,
            (GameOver, Lobby) => true,
            (from, Lobby) => from.is_active(),
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Joining => write!(f, "Joining"),
            Self::AwaitingReady => write!(f, "AwaitingReady"),
            Self::MyTurn => write!(f, "MyTurn"),
            Self::OpponentTurn => write!(f, "OpponentTurn"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}
