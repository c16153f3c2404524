//! HTTP turn channel using `reqwest`.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};
use xo_protocol::{
    Codec, ErrorResponse, GAME_ID_HEADER, JsonCodec, MoveAccepted,
    MoveRequest, NewGameResponse, OpponentMove, PLAYER_ID_HEADER, PlayerId,
    Position, ReadyRequest, ReadyResponse, SessionId, Side,
};

use crate::{TurnChannel, TurnError};

/// Message used when a rejected move comes without an explanation.
const UNKNOWN_REJECTION: &str = "Unknown error";

/// A [`TurnChannel`] that talks to the game server's HTTP API.
///
/// | operation | request |
/// |-----------|---------|
/// | create    | `POST /newGame` |
/// | ready     | `POST /gameReady` (`410 Gone` = no opponent) |
/// | move      | `POST /move` |
/// | poll      | `GET /move` |
/// | surrender | `PUT /surrender` |
#[derive(Debug, Clone)]
pub struct HttpTurnChannel<C: Codec = JsonCodec> {
    base_url: String,
    client: reqwest::Client,
    codec: C,
}

impl HttpTurnChannel<JsonCodec> {
    /// Creates a channel rooted at `base_url` (e.g. `http://host:8080`).
    ///
    /// `request_timeout` bounds every request, long-polls included; leave
    /// it `None` to let the server decide when a poll ends.
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, TurnError> {
        Self::with_codec(base_url, request_timeout, JsonCodec)
    }
}

impl<C: Codec> HttpTurnChannel<C> {
    /// Creates a channel that encodes bodies with `codec`.
    pub fn with_codec(
        base_url: impl Into<String>,
        request_timeout: Option<Duration>,
        codec: C,
    ) -> Result<Self, TurnError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Ok(Self {
            base_url,
            client,
            codec,
        })
    }

    /// Returns the server root this channel talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn with_body<T: Serialize>(
        &self,
        request: RequestBuilder,
        body: &T,
    ) -> Result<RequestBuilder, TurnError> {
        Ok(request
            .header(CONTENT_TYPE, self.codec.content_type())
            .body(self.codec.encode(body)?))
    }

    /// Sends `request` and returns the status and raw body.
    async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), TurnError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok((status, body.to_vec()))
    }
}

/// Attaches the correlation headers every in-game call carries.
fn with_ids(
    request: RequestBuilder,
    player: &PlayerId,
    session: &SessionId,
) -> RequestBuilder {
    request
        .header(GAME_ID_HEADER, session.as_str())
        .header(PLAYER_ID_HEADER, player.as_str())
}

fn transport_error(e: reqwest::Error) -> TurnError {
    let kind = if e.is_timeout() {
        std::io::ErrorKind::TimedOut
    } else if e.is_connect() {
        std::io::ErrorKind::ConnectionRefused
    } else {
        std::io::ErrorKind::Other
    };
    TurnError::Transport(std::io::Error::new(kind, e))
}

impl<C: Codec> TurnChannel for HttpTurnChannel<C> {
    #[instrument(skip_all)]
    async fn create_session(&self) -> Result<SessionId, TurnError> {
        let (status, body) =
            self.send(self.client.post(self.url("newGame"))).await?;
        if !status.is_success() {
            return Err(TurnError::Status(status.as_u16()));
        }

        let response: NewGameResponse = self.codec.decode(&body)?;
        debug!(session_id = %response.your_id, "session created");
        Ok(response.your_id)
    }

    #[instrument(skip_all, fields(%player, %session))]
    async fn confirm_ready(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> Result<Side, TurnError> {
        let body = ReadyRequest {
            player: player.clone(),
            game: session.clone(),
        };
        let request =
            self.with_body(self.client.post(self.url("gameReady")), &body)?;
        let (status, body) = self.send(request).await?;

        if status == StatusCode::GONE {
            return Err(TurnError::NoOpponentTimeout);
        }
        if !status.is_success() {
            return Err(TurnError::Status(status.as_u16()));
        }

        let response: ReadyResponse = self.codec.decode(&body)?;
        Ok(response.side)
    }

    #[instrument(skip_all, fields(%position, %player, %session))]
    async fn submit_move(
        &self,
        position: Position,
        player: &PlayerId,
        session: &SessionId,
    ) -> Result<MoveAccepted, TurnError> {
        let request = self.with_body(
            with_ids(self.client.post(self.url("move")), player, session),
            &MoveRequest { position },
        )?;
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            // A rejection explains itself in the body; a body we can't
            // read still means the move was refused.
            let reason = self
                .codec
                .decode::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| UNKNOWN_REJECTION.to_owned());
            debug!(status = status.as_u16(), %reason, "move rejected");
            return Err(TurnError::Rejected(reason));
        }

        Ok(self.codec.decode(&body)?)
    }

    #[instrument(skip_all, fields(%player, %session))]
    async fn poll_opponent_move(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> Result<OpponentMove, TurnError> {
        let request = with_ids(self.client.get(self.url("move")), player, session)
            .header(CACHE_CONTROL, "no-cache");
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(TurnError::Status(status.as_u16()));
        }

        let response: OpponentMove = self.codec.decode(&body)?;
        Ok(response.validate()?)
    }

    #[instrument(skip_all, fields(%player, %session))]
    async fn surrender(
        &self,
        player: &PlayerId,
        session: &SessionId,
    ) -> Result<(), TurnError> {
        let request =
            with_ids(self.client.put(self.url("surrender")), player, session);
        let (status, _body) = self.send(request).await?;
        if !status.is_success() {
            return Err(TurnError::Status(status.as_u16()));
        }
        Ok(())
    }
}
