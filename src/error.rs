// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Error taxonomy for the session core.
//!
//! Three layers, matching how failures propagate:
//! - [`CodecError`]: a malformed frame or payload, fatal for that frame
//!   (and the channel that received it), never a panic.
//! - [`TransportError`]: connect/handshake/close failures, with the
//!   unauthorized rejection distinguished so the coordinator can force
//!   re-authentication instead of reporting generic connectivity loss.
//! - [`ChannelError`]: what a channel's consume loop terminates with:
//!   transport, codec, or an explicit `ERROR` frame from the server.

/// A frame or embedded payload that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("{action} frame is missing token {index}")]
    MissingToken { action: &'static str, index: usize },

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a numeric token, got {0:?}")]
    Number(String),

    #[error("invalid encoded polyline: {0}")]
    Polyline(String),
}

/// Transport-level failure on either socket.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connection rejected: unauthorized")]
    Unauthorized,

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("connection error: {0}")]
    Io(String),

    #[error("connection closed")]
    Closed,
}

/// Terminal failure of a channel's event stream.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed frame: {0}")]
    Codec(#[from] CodecError),

    /// An explicit `ERROR <text>` frame from the trip endpoint.
    #[error("server error: {0}")]
    Protocol(String),
}

impl ChannelError {
    /// True when the failure was an unauthorized handshake rejection.
    /// The coordinator reacts by invalidating the stored credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ChannelError::Transport(TransportError::Unauthorized))
    }
}
