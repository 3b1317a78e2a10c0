// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! WebSocket transport backed by tokio-tungstenite.
//!
//! Each connection runs a pump task that bridges the socket and the
//! [`Connection`] frame queues, so channel code never blocks on socket
//! I/O directly. Liveness detection is left to the transport/server; the
//! client adds no watchdog of its own.

use super::{Connection, Transport};
use crate::error::TransportError;
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;

const FRAME_QUEUE_DEPTH: usize = 32;

/// Connects to `<base>/<path>` with a bearer Authorization header.
#[derive(Clone)]
pub struct WsTransport {
    /// e.g. `wss://rides.example.org` (no trailing slash)
    base_url: String,
}

impl WsTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Transport for WsTransport {
    fn connect(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> BoxFuture<'static, Result<Connection, TransportError>> {
        let url = format!("{}{}", self.base_url, path);
        let authorization = format!("Bearer {}", bearer_token);

        Box::pin(async move {
            let mut request = url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            request.headers_mut().insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&authorization)
                    .map_err(|e| TransportError::Connect(e.to_string()))?,
            );

            let (socket, _response) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(map_handshake_error)?;
            tracing::debug!(url = %url, "websocket connected");

            let (out_tx, out_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
            let (in_tx, in_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
            let closer = CancellationToken::new();

            tokio::spawn(pump(socket, out_rx, in_tx, closer.clone()));

            Ok(Connection::new(out_tx, in_rx, closer))
        })
    }
}

/// Map a failed handshake, distinguishing the unauthorized rejection so
/// the coordinator can force re-authentication.
fn map_handshake_error(err: WsError) -> TransportError {
    match err {
        WsError::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
            TransportError::Unauthorized
        }
        other => TransportError::Connect(other.to_string()),
    }
}

/// Bridge one socket with the connection's frame queues until either
/// side finishes. Frames are forwarded strictly in arrival order.
async fn pump(
    socket: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    mut out_rx: mpsc::Receiver<String>,
    in_tx: mpsc::Sender<Result<String, TransportError>>,
    closer: CancellationToken,
) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            _ = closer.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            frame = out_rx.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        tracing::debug!(error = %e, "websocket send failed");
                        let _ = in_tx.send(Err(TransportError::Io(e.to_string()))).await;
                        break;
                    }
                }
                // All writers dropped: local teardown.
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if in_tx.send(Ok(text.to_string())).await.is_err() {
                        break;
                    }
                }
                // Ping/pong are handled by tungstenite; binary is not
                // part of this protocol.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_)
                    | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    let _ = in_tx.send(Err(TransportError::Io(e.to_string()))).await;
                    break;
                }
            },
        }
    }

    closer.cancel();
    tracing::debug!("websocket pump finished");
}
