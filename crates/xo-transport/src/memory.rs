//! In-process [`Connection`] backed by Tokio channels.
//!
//! Lets the push channel and the client run against a scripted server
//! without opening sockets. The [`MemoryPeer`] half plays the server.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::{CloseInfo, Connection, ConnectionId, Frame, TransportError};

/// Memory connections count down from the top so their ids never collide
/// with socket-backed ones in logs.
static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(u64::MAX);

type Inbound = Result<Frame, TransportError>;

/// Client half of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    inbound: Mutex<mpsc::UnboundedReceiver<Inbound>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

/// Server half of an in-memory connection.
pub struct MemoryPeer {
    inbound: mpsc::UnboundedSender<Inbound>,
    outbound: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MemoryConnection {
    /// Creates a connected client/server pair.
    pub fn pair() -> (Self, MemoryPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let id =
            ConnectionId::new(NEXT_MEMORY_ID.fetch_sub(1, Ordering::Relaxed));
        (
            Self {
                id,
                inbound: Mutex::new(in_rx),
                outbound: out_tx,
            },
            MemoryPeer {
                inbound: in_tx,
                outbound: out_rx,
            },
        )
    }
}

impl MemoryPeer {
    /// Delivers a data frame to the client. Returns `false` once the
    /// client half is gone.
    pub fn deliver(&self, data: impl Into<Vec<u8>>) -> bool {
        self.inbound.send(Ok(Frame::Data(data.into()))).is_ok()
    }

    /// Completes a close handshake with the given code and reason.
    pub fn close(&self, code: u16, reason: &str) -> bool {
        self.inbound
            .send(Ok(Frame::Closed(CloseInfo {
                code,
                reason: reason.to_owned(),
            })))
            .is_ok()
    }

    /// Makes the client's next `recv` fail with `error`.
    pub fn fail(&self, error: TransportError) -> bool {
        self.inbound.send(Err(error)).is_ok()
    }

    /// Waits for the next payload the client sent.
    pub async fn next_sent(&mut self) -> Option<Vec<u8>> {
        self.outbound.recv().await
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.outbound.send(data.to_vec()).map_err(|_| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "memory peer dropped",
            ))
        })
    }

    async fn recv(&self) -> Result<Frame, Self::Error> {
        match self.inbound.lock().await.recv().await {
            Some(inbound) => inbound,
            None => Err(TransportError::ConnectionClosed(
                "memory peer dropped".into(),
            )),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
