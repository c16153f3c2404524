//! `GameClient` builder and event loop.
//!
//! This is the entry point for running an xo client. It ties together all
//! the layers: transport → channels → controller → presenter.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use xo_channel::{HttpTurnChannel, PushChannel, PushEvent, TurnChannel};
use xo_transport::{Connection, TransportError, WebSocketConnection};

use crate::controller::{
    ClientEvent, Effect, SessionController, TurnOutcome, TurnRequest,
    TurnResolution,
};
use crate::presenter::{Presenter, UiEvent};
use crate::{ClientConfig, ClientError};

// ---------------------------------------------------------------------------
// UiHandle
// ---------------------------------------------------------------------------

/// Feeds player input into a running [`GameClient`].
///
/// Cheap to clone; every clone posts to the same event queue.
#[derive(Debug, Clone)]
pub struct UiHandle {
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl UiHandle {
    /// Queues a UI event.
    ///
    /// # Errors
    /// Returns [`ClientError::Stopped`] once the event loop has exited.
    pub fn send(&self, event: UiEvent) -> Result<(), ClientError> {
        self.events
            .send(ClientEvent::Ui(event))
            .map_err(|_| ClientError::Stopped)
    }

    /// Asks the event loop to stop after the events already queued.
    pub fn shutdown(&self) -> Result<(), ClientError> {
        self.events
            .send(ClientEvent::Shutdown)
            .map_err(|_| ClientError::Stopped)
    }
}

// ---------------------------------------------------------------------------
// GameClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and connecting an xo client.
///
/// # Example
///
/// ```rust,ignore
/// use xo::prelude::*;
///
/// let (client, ui) = GameClientBuilder::new()
///     .server_url("http://localhost:3000")
///     .push_url("ws://localhost:3000/games")
///     .connect(my_presenter)
///     .await?;
/// tokio::spawn(client.run());
/// ui.send(UiEvent::CreateGame)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameClientBuilder {
    config: ClientConfig,
}

impl GameClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the root of the HTTP turn API.
    pub fn server_url(mut self, url: &str) -> Self {
        self.config.server_url = url.to_string();
        self
    }

    /// Sets the WebSocket endpoint of the lobby.
    pub fn push_url(mut self, url: &str) -> Self {
        self.config.push_url = url.to_string();
        self
    }

    /// Bounds every HTTP request, long-polls included.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Sets the pause before a failed poll is re-issued.
    pub fn poll_retry_delay(mut self, delay: Duration) -> Self {
        self.config.poll_retry_delay = delay;
        self
    }

    /// Opens the push connection and builds the HTTP turn channel.
    ///
    /// Uses `WebSocketConnection` and `HttpTurnChannel` with JSON bodies.
    pub async fn connect<P: Presenter>(
        self,
        presenter: P,
    ) -> Result<
        (GameClient<HttpTurnChannel, WebSocketConnection, P>, UiHandle),
        ClientError,
    > {
        let turn = HttpTurnChannel::new(
            self.config.server_url.as_str(),
            self.config.request_timeout,
        )?;
        let conn = WebSocketConnection::connect(&self.config.push_url).await?;
        tracing::info!(
            server = %self.config.server_url,
            push = %self.config.push_url,
            "connected"
        );
        Ok(GameClient::new(self.config, turn, conn, presenter))
    }
}

// ---------------------------------------------------------------------------
// GameClient
// ---------------------------------------------------------------------------

/// A connected xo client.
///
/// Call [`run()`](Self::run) to start processing events. Input arrives
/// through the [`UiHandle`] returned alongside it.
pub struct GameClient<T, C, P>
where
    T: TurnChannel,
    C: Connection<Error = TransportError>,
    P: Presenter,
{
    config: ClientConfig,
    controller: SessionController,
    turn: Arc<T>,
    push: PushChannel<C>,
    presenter: P,
    events_tx: mpsc::UnboundedSender<ClientEvent>,
    events_rx: mpsc::UnboundedReceiver<ClientEvent>,
}

impl<T, C, P> GameClient<T, C, P>
where
    T: TurnChannel,
    C: Connection<Error = TransportError>,
    P: Presenter,
{
    /// Assembles a client from already-open channels.
    pub fn new(
        config: ClientConfig,
        turn: T,
        conn: C,
        presenter: P,
    ) -> (Self, UiHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = UiHandle {
            events: events_tx.clone(),
        };
        let client = Self {
            config,
            controller: SessionController::new(),
            turn: Arc::new(turn),
            push: PushChannel::new(conn),
            presenter,
            events_tx,
            events_rx,
        };
        (client, handle)
    }

    /// Runs the event loop until [`UiHandle::shutdown`] is called.
    ///
    /// Events are handled strictly one at a time in arrival order.
    /// Requests and registrations run on their own tasks and report back
    /// through the same queue, so the loop never waits on the network.
    pub async fn run(mut self) -> Result<(), ClientError> {
        tracing::info!(conn = %self.push.connection_id(), "xo client running");
        let reader = self.push.spawn_reader(self.events_tx.clone());

        for effect in self.controller.start() {
            self.execute(effect);
        }

        while let Some(event) = self.events_rx.recv().await {
            if matches!(event, ClientEvent::Shutdown) {
                tracing::info!("shutdown requested");
                break;
            }
            for effect in self.controller.handle(event) {
                self.execute(effect);
            }
        }

        reader.abort();
        self.push.close().await?;
        Ok(())
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Present(intent) => self.presenter.apply(intent),
            Effect::Register(session_id) => {
                let push = self.push.clone();
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = push.register(&session_id).await {
                        tracing::warn!(%session_id, error = %e, "registration failed");
                        let _ = events
                            .send(ClientEvent::Push(PushEvent::Error(e.to_string())));
                    }
                });
            }
            Effect::Request(ticket, request) => {
                let turn = Arc::clone(&self.turn);
                let events = self.events_tx.clone();
                let retry_delay = self.config.poll_retry_delay;
                tokio::spawn(async move {
                    let outcome = perform(&*turn, request, retry_delay).await;
                    // The loop may already be gone at shutdown.
                    let _ = events.send(ClientEvent::Turn(TurnResolution {
                        ticket,
                        outcome,
                    }));
                });
            }
        }
    }
}

/// Makes the turn-channel call `request` describes.
async fn perform<T: TurnChannel>(
    turn: &T,
    request: TurnRequest,
    poll_retry_delay: Duration,
) -> TurnOutcome {
    match request {
        TurnRequest::CreateSession => {
            TurnOutcome::SessionCreated(turn.create_session().await)
        }
        TurnRequest::ConfirmReady { player, session } => {
            TurnOutcome::Ready(turn.confirm_ready(&player, &session).await)
        }
        TurnRequest::SubmitMove {
            position,
            player,
            session,
        } => TurnOutcome::MoveSubmitted {
            position,
            result: turn.submit_move(position, &player, &session).await,
        },
        TurnRequest::PollOpponentMove {
            player,
            session,
            attempt,
        } => {
            if attempt > 0 && !poll_retry_delay.is_zero() {
                tokio::time::sleep(poll_retry_delay).await;
            }
            TurnOutcome::OpponentMoved {
                attempt,
                result: turn.poll_opponent_move(&player, &session).await,
            }
        }
        TurnRequest::Surrender { player, session } => {
            TurnOutcome::Surrendered(turn.surrender(&player, &session).await)
        }
    }
}
