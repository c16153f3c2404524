//! The push side of the game protocol: lobby and game-start notifications.
//!
//! A single connection is opened at startup and kept for the life of the
//! client. A reader task turns every inbound frame into a [`PushEvent`]
//! and forwards it to whoever owns the event queue (the client's event
//! loop). The outgoing side is just [`PushChannel::register`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use xo_protocol::{Codec, JsonCodec, LobbyMessage, Registration, SessionId};
use xo_transport::{Connection, ConnectionId, Frame, TransportError};

use crate::ChannelError;

/// Close code reported when the connection dropped without a close
/// handshake, mirroring the WebSocket "abnormal closure" code.
const ABNORMAL_CLOSURE: u16 = 1006;

/// Something that arrived on (or happened to) the push connection.
///
/// The first three variants are protocol events. The rest are
/// connection lifecycle signals: they are reported for observability and
/// to re-enable game creation, never to end a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A session is waiting for a second player.
    LobbyAdd(SessionId),
    /// A session left the lobby.
    LobbyRemove(SessionId),
    /// The session's players are both registered; the game starts.
    GameStart(SessionId),
    /// The connection is up and the reader is running.
    Opened,
    /// The connection ended. `clean` is `true` when a close handshake
    /// completed.
    Closed {
        clean: bool,
        code: u16,
        reason: String,
    },
    /// The connection failed.
    Error(String),
}

impl From<LobbyMessage> for PushEvent {
    fn from(msg: LobbyMessage) -> Self {
        match msg {
            LobbyMessage::Add { id } => Self::LobbyAdd(id),
            LobbyMessage::Remove { id } => Self::LobbyRemove(id),
            LobbyMessage::StartGame { id } => Self::GameStart(id),
        }
    }
}

/// Handle to the push connection.
///
/// Cheap to clone: clones share the same connection.
pub struct PushChannel<C, K = JsonCodec>
where
    C: Connection<Error = TransportError>,
    K: Codec + Clone,
{
    conn: Arc<C>,
    codec: K,
}

impl<C, K> Clone for PushChannel<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec + Clone,
{
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            codec: self.codec.clone(),
        }
    }
}

impl<C> PushChannel<C, JsonCodec>
where
    C: Connection<Error = TransportError>,
{
    /// Wraps an open connection, speaking JSON.
    pub fn new(conn: C) -> Self {
        Self::with_codec(conn, JsonCodec)
    }
}

impl<C, K> PushChannel<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec + Clone,
{
    /// Wraps an open connection with a custom codec.
    pub fn with_codec(conn: C, codec: K) -> Self {
        Self {
            conn: Arc::new(conn),
            codec,
        }
    }

    /// Returns the id of the underlying connection.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Announces interest in `session_id`. The server answers with a
    /// [`PushEvent::GameStart`] once both players have registered.
    pub async fn register(
        &self,
        session_id: &SessionId,
    ) -> Result<(), ChannelError> {
        let msg = Registration {
            register: session_id.clone(),
        };
        let bytes = self.codec.encode(&msg)?;
        self.conn.send(&bytes).await?;
        tracing::debug!(conn = %self.conn.id(), %session_id, "registered for session");
        Ok(())
    }

    /// Closes the connection.
    pub async fn close(&self) -> Result<(), ChannelError> {
        self.conn.close().await?;
        Ok(())
    }

    /// Spawns the reader task.
    ///
    /// Every event is converted with `E::from` and sent on `events`. The
    /// task stops after the connection ends or once `events` is closed.
    pub fn spawn_reader<E>(
        &self,
        events: mpsc::UnboundedSender<E>,
    ) -> JoinHandle<()>
    where
        E: From<PushEvent> + Send + 'static,
    {
        tokio::spawn(read_loop(
            Arc::clone(&self.conn),
            self.codec.clone(),
            events,
        ))
    }
}

async fn read_loop<C, K, E>(
    conn: Arc<C>,
    codec: K,
    events: mpsc::UnboundedSender<E>,
) where
    C: Connection<Error = TransportError>,
    K: Codec,
    E: From<PushEvent> + Send + 'static,
{
    let conn_id = conn.id();
    tracing::info!(%conn_id, "push channel open");
    if events.send(PushEvent::Opened.into()).is_err() {
        return;
    }

    loop {
        let event = match conn.recv().await {
            Ok(Frame::Data(data)) => {
                match codec.decode::<LobbyMessage>(&data) {
                    Ok(msg) => PushEvent::from(msg),
                    Err(e) => {
                        tracing::debug!(
                            %conn_id, error = %e, "skipping undecodable push message"
                        );
                        continue;
                    }
                }
            }
            Ok(Frame::Closed(info)) => {
                tracing::info!(
                    %conn_id, code = info.code, reason = %info.reason,
                    "push channel closed cleanly"
                );
                let _ = events.send(
                    PushEvent::Closed {
                        clean: true,
                        code: info.code,
                        reason: info.reason,
                    }
                    .into(),
                );
                return;
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "push channel terminated");
                let _ = events.send(PushEvent::Error(e.to_string()).into());
                let _ = events.send(
                    PushEvent::Closed {
                        clean: false,
                        code: ABNORMAL_CLOSURE,
                        reason: e.to_string(),
                    }
                    .into(),
                );
                return;
            }
        };

        tracing::debug!(%conn_id, ?event, "push event received");
        if events.send(event.into()).is_err() {
            tracing::debug!(%conn_id, "event queue closed, stopping reader");
            return;
        }
    }
}
