// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Transport seam between the channels and the actual sockets.
//!
//! A [`Transport`] produces authenticated [`Connection`]s: plain-text
//! frames in, plain-text frames out. The production implementation is
//! [`ws::WsTransport`]; tests substitute an in-memory mock. Keeping the
//! seam here means the channels never see socket types.

pub mod ws;

use crate::error::TransportError;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Factory for authenticated connections to one server.
pub trait Transport: Send + Sync {
    /// Open a connection to `path`, authenticating with the given bearer
    /// token. An unauthorized handshake rejection must surface as
    /// [`TransportError::Unauthorized`].
    fn connect(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> BoxFuture<'static, Result<Connection, TransportError>>;
}

/// An open, frame-oriented connection.
///
/// Built from three parts so implementations can drive the actual socket
/// from a pump task: an outgoing frame queue, an incoming frame queue,
/// and a cancellation token that tears the transport down.
pub struct Connection {
    outgoing: mpsc::Sender<String>,
    incoming: mpsc::Receiver<Result<String, TransportError>>,
    closer: CancellationToken,
}

impl Connection {
    pub fn new(
        outgoing: mpsc::Sender<String>,
        incoming: mpsc::Receiver<Result<String, TransportError>>,
        closer: CancellationToken,
    ) -> Self {
        Self {
            outgoing,
            incoming,
            closer,
        }
    }

    /// Split into independently owned halves: the reader is consumed by
    /// exactly one task; the writer can be cloned for caller-initiated
    /// sends.
    pub fn split(self) -> (FrameReader, FrameWriter) {
        let reader = FrameReader {
            incoming: self.incoming,
            closer: self.closer.clone(),
        };
        let writer = FrameWriter {
            outgoing: self.outgoing,
            closer: self.closer,
        };
        (reader, writer)
    }
}

/// Receiving half of a connection. Yields frames strictly in arrival
/// order; `None` means the connection is finished (remote close or local
/// teardown).
pub struct FrameReader {
    incoming: mpsc::Receiver<Result<String, TransportError>>,
    closer: CancellationToken,
}

impl FrameReader {
    pub async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        tokio::select! {
            _ = self.closer.cancelled() => None,
            frame = self.incoming.recv() => frame,
        }
    }
}

/// Sending half of a connection. Sends racing a close in progress fail
/// silently; the connection is treated as already stopped.
#[derive(Clone)]
pub struct FrameWriter {
    outgoing: mpsc::Sender<String>,
    closer: CancellationToken,
}

impl FrameWriter {
    /// Queue a frame for sending. Returns `Err(TransportError::Closed)`
    /// when the connection is closing or gone; callers for whom the send
    /// is advisory ignore the result.
    pub async fn send(&self, frame: String) -> Result<(), TransportError> {
        if self.closer.is_cancelled() {
            return Err(TransportError::Closed);
        }
        self.outgoing
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Tear the transport down. Idempotent.
    pub fn close(&self) {
        self.closer.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_cancelled()
    }
}
