// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! The "in an active trip" socket session.

use super::TRIP_PATH;
use crate::error::ChannelError;
use crate::models::{LocationBroadcast, Point, Profile, TripSnapshot};
use crate::transport::{FrameReader, FrameWriter, Transport};
use crate::wire;
use crate::wire::trip::{self, TripAction};

/// Server-pushed updates while in a trip.
#[derive(Debug, Clone)]
pub enum TripEvent {
    /// Authoritative snapshot; replaces all prior trip state wholesale.
    StateUpdate(TripSnapshot),
    /// New route polyline; replaces the displayed path wholesale.
    Polyline(Vec<Point>),
    /// A participant's latest location.
    Location(LocationBroadcast),
    /// A participant asked for cancellation. Informational; any state
    /// change arrives via the next snapshot.
    CancelRequested,
}

/// Marker type; channels are opened, not constructed.
pub struct TripChannel;

impl TripChannel {
    /// Connect, authenticate, and join the given trip room.
    pub async fn open(
        transport: &dyn Transport,
        bearer_token: &str,
        trip_id: &str,
    ) -> Result<(TripEvents, TripHandle), ChannelError> {
        let connection = transport.connect(TRIP_PATH, bearer_token).await?;
        let (reader, writer) = connection.split();
        writer.send(trip::join_trip_frame(trip_id)).await?;
        tracing::info!(trip_id, "trip channel open");

        Ok((TripEvents { reader }, TripHandle { writer }))
    }
}

/// Consuming half: a finite, in-order event sequence.
pub struct TripEvents {
    reader: FrameReader,
}

impl TripEvents {
    /// Next event, `Ok(None)` once the connection is closed. An `ERROR`
    /// frame terminates the stream with [`ChannelError::Protocol`].
    pub async fn next(&mut self) -> Result<Option<TripEvent>, ChannelError> {
        loop {
            let frame = match self.reader.recv().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(frame)) => frame,
            };
            let (action, tokens) = wire::split_frame(&frame);
            let action: TripAction = match action.parse() {
                Ok(action) => action,
                Err(_) => {
                    tracing::warn!(action, "unknown trip action, frame dropped");
                    continue;
                }
            };
            match action {
                TripAction::TripStateUpdate => {
                    return Ok(Some(TripEvent::StateUpdate(trip::parse_trip_state(
                        &tokens,
                    )?)));
                }
                TripAction::PolylineUpdate => {
                    return Ok(Some(TripEvent::Polyline(trip::parse_polyline_update(
                        &tokens,
                    )?)));
                }
                TripAction::LocationBroadcast => {
                    return Ok(Some(TripEvent::Location(trip::parse_location_broadcast(
                        &tokens,
                    )?)));
                }
                TripAction::Error => {
                    return Err(ChannelError::Protocol(trip::parse_error_message(&tokens)));
                }
                TripAction::CancelRequestBroadcast => {
                    return Ok(Some(TripEvent::CancelRequested));
                }
                other => {
                    tracing::debug!(action = other.as_str(), "unhandled trip action");
                }
            }
        }
    }
}

/// Sending half. All operations are fire-and-forget: effects are
/// observed via the next `TRIP_STATE_UPDATE`, and sends racing a close
/// are skipped silently.
#[derive(Clone)]
pub struct TripHandle {
    writer: FrameWriter,
}

impl TripHandle {
    pub async fn send_location(&self, location: Point) -> Result<(), ChannelError> {
        self.send(trip::update_location_frame(location)?).await;
        Ok(())
    }

    pub async fn pickup_passenger(&self, passenger: &Profile) -> Result<(), ChannelError> {
        self.send(trip::passenger_action_frame(
            TripAction::PickupPassenger,
            passenger,
        )?)
        .await;
        Ok(())
    }

    pub async fn dropoff_passenger(&self, passenger: &Profile) -> Result<(), ChannelError> {
        self.send(trip::passenger_action_frame(
            TripAction::DropoffPassenger,
            passenger,
        )?)
        .await;
        Ok(())
    }

    /// Ask for cancellation. Both parties must do this independently;
    /// the server reflects a mutual cancellation in a later snapshot.
    pub async fn request_cancellation(&self) {
        self.send(trip::cancellation_request_frame()).await;
    }

    /// Local detach only; clears no server state. Idempotent.
    pub fn close(&self) {
        self.writer.close();
    }

    async fn send(&self, frame: String) {
        if let Err(e) = self.writer.send(frame).await {
            tracing::debug!(error = %e, "trip send skipped, connection closing");
        }
    }
}
