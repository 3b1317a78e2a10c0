// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Wire codec for the text protocol spoken on both sockets.
//!
//! One frame per message: space-separated tokens, first token is the
//! action name. Structured payloads (profiles, points, trip snapshots)
//! are JSON-encoded then base64-encoded so they cannot collide with the
//! token separator. Street addresses are base64 of the raw text. Numeric
//! tokens are decimal ASCII.
//!
//! The one deliberate exception is the driver route registration, which
//! uses literal `lat,lng:lat,lng` segment tokens; see
//! [`matching::register_driver_frame`].

pub mod matching;
pub mod trip;

use crate::error::CodecError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Split a frame into its action name and remaining tokens.
///
/// An empty frame yields an empty action name, which no action enum
/// recognizes; callers treat that like any other unknown action.
pub fn split_frame(frame: &str) -> (&str, Vec<&str>) {
    let mut parts = frame.split(' ');
    let action = parts.next().unwrap_or("");
    (action, parts.collect())
}

/// Join an action name and pre-encoded tokens into one frame.
pub fn join_frame(action: &str, tokens: &[&str]) -> String {
    let mut frame = String::from(action);
    for token in tokens {
        frame.push(' ');
        frame.push_str(token);
    }
    frame
}

/// Encode a structured value as a base64(JSON) token.
pub fn encode_token<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_string(value)?;
    Ok(BASE64.encode(json))
}

/// Decode a base64(JSON) token back into a structured value.
///
/// Failure here is fatal for the frame: it signals a corrupt or
/// protocol-mismatched peer, not normal protocol evolution.
pub fn decode_token<T: DeserializeOwned>(token: &str) -> Result<T, CodecError> {
    let bytes = BASE64.decode(token)?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// Encode raw text (e.g. a street address) as a base64 token.
pub fn encode_text(text: &str) -> String {
    BASE64.encode(text)
}

/// Decode a base64 text token.
pub fn decode_text(token: &str) -> Result<String, CodecError> {
    let bytes = BASE64.decode(token)?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse a decimal integer token.
pub fn decode_int(token: &str) -> Result<i64, CodecError> {
    token
        .parse()
        .map_err(|_| CodecError::Number(token.to_string()))
}

/// Fetch a required token by index, or fail with a per-frame fatal error
/// naming the action. Guards against indexing out of range on truncated
/// frames.
pub fn required<'a>(
    tokens: &[&'a str],
    index: usize,
    action: &'static str,
) -> Result<&'a str, CodecError> {
    tokens
        .get(index)
        .copied()
        .ok_or(CodecError::MissingToken { action, index })
}
