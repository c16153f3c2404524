//! # xo
//!
//! Client for a two-player, turn-based board game played against a
//! remote server over two channels.
//!
//! - a WebSocket **push channel** announces lobby entries and game starts;
//! - an HTTP **turn channel** creates sessions, confirms readiness,
//!   submits moves, long-polls the opponent's move, and surrenders.
//!
//! The [`SessionController`] is the only component that interprets
//! events from either channel. It owns the client's session state and
//! tells a [`Presenter`] what to draw. [`GameClient`] runs the controller
//! on a single ordered event queue.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xo::prelude::*;
//!
//! // Implement Presenter for your UI, then:
//! // let (client, ui) = GameClientBuilder::new()
//! //     .server_url("http://localhost:3000")
//! //     .push_url("ws://localhost:3000/games")
//! //     .connect(my_presenter)
//! //     .await?;
//! // tokio::spawn(client.run());
//! // ui.send(UiEvent::CreateGame)?;
//! ```

mod client;
mod config;
mod controller;
mod error;
mod presenter;

pub use client::{GameClient, GameClientBuilder, UiHandle};
pub use config::ClientConfig;
pub use controller::{
    ClientEvent, Effect, SessionController, TurnOutcome, TurnRequest,
    TurnResolution,
};
pub use error::ClientError;
pub use presenter::{Intent, Presenter, UiEvent};

/// Common imports for building an xo front end.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientError, GameClient, GameClientBuilder, Intent,
        Presenter, UiEvent, UiHandle,
    };
    pub use xo_channel::{PushEvent, TurnChannel, TurnError};
    pub use xo_protocol::{PlayerId, Position, SessionId, Side};
    pub use xo_session::Phase;
}
