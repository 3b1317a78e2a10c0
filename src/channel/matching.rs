// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! The "looking for a match" socket session.

use super::MATCHING_PATH;
use crate::error::ChannelError;
use crate::models::{Point, Profile, RouteSegment, TripRequest, VehiclePreference};
use crate::transport::{FrameReader, FrameWriter, Transport};
use crate::wire;
use crate::wire::matching::{self, MatchingAction};

/// The role this client registers as.
#[derive(Debug, Clone)]
pub enum MatchingRole {
    Passenger {
        vehicle: VehiclePreference,
        pickup: Point,
        destination: Point,
    },
    Driver {
        /// Ordered polyline, at least two points.
        route: Vec<Point>,
        /// Available seats, at least one.
        available_slots: u32,
    },
}

impl MatchingRole {
    fn register_frame(&self) -> Result<String, ChannelError> {
        match self {
            MatchingRole::Passenger {
                vehicle,
                pickup,
                destination,
            } => Ok(matching::register_passenger_frame(
                *vehicle,
                *pickup,
                *destination,
            )?),
            MatchingRole::Driver {
                route,
                available_slots,
            } => {
                let segments = RouteSegment::from_polyline(route);
                Ok(matching::register_driver_frame(&segments, *available_slots))
            }
        }
    }
}

/// Events surfaced to the coordinator while matching.
#[derive(Debug, Clone)]
pub enum MatchingEvent {
    /// Driver-only: a candidate passenger wants a ride. Several may be
    /// pending at once.
    TripRequest(TripRequest),
    /// Both roles: a trip was formed. Terminal: the channel closes
    /// itself and emits nothing further.
    Match {
        trip_id: String,
        counterpart: Profile,
    },
    /// Driver-only: a prior trip request was withdrawn.
    MatchCancel(Profile),
}

/// Marker type; channels are opened, not constructed.
pub struct MatchingChannel;

impl MatchingChannel {
    /// Connect, authenticate, and send exactly one registration frame
    /// for the given role.
    pub async fn open(
        transport: &dyn Transport,
        bearer_token: &str,
        role: &MatchingRole,
    ) -> Result<(MatchingEvents, MatchingHandle), ChannelError> {
        let connection = transport.connect(MATCHING_PATH, bearer_token).await?;
        let (reader, writer) = connection.split();
        writer.send(role.register_frame()?).await?;
        tracing::info!("matching channel open");

        let events = MatchingEvents {
            reader,
            writer: writer.clone(),
            finished: false,
        };
        Ok((events, MatchingHandle { writer }))
    }
}

/// Consuming half: a finite, in-order event sequence. Exactly one task
/// consumes it.
pub struct MatchingEvents {
    reader: FrameReader,
    writer: FrameWriter,
    finished: bool,
}

impl MatchingEvents {
    /// Next event, `Ok(None)` once the channel is done (connection
    /// closed, or a terminal MATCH was delivered). Unknown and
    /// recognized-but-unhandled actions are logged and skipped.
    pub async fn next(&mut self) -> Result<Option<MatchingEvent>, ChannelError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            let frame = match self.reader.recv().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(frame)) => frame,
            };
            let (action, tokens) = wire::split_frame(&frame);
            let action: MatchingAction = match action.parse() {
                Ok(action) => action,
                Err(_) => {
                    tracing::warn!(action, "unknown matching action, frame dropped");
                    continue;
                }
            };
            match action {
                MatchingAction::TripRequest => {
                    return Ok(Some(MatchingEvent::TripRequest(
                        matching::parse_trip_request(&tokens)?,
                    )));
                }
                MatchingAction::Match => {
                    let (trip_id, counterpart) = matching::parse_match(&tokens)?;
                    tracing::info!(trip_id = %trip_id, "match found, closing matching channel");
                    // Terminal: no further frames are processed.
                    self.finished = true;
                    self.writer.close();
                    return Ok(Some(MatchingEvent::Match {
                        trip_id,
                        counterpart,
                    }));
                }
                MatchingAction::MatchCancel => {
                    return Ok(Some(MatchingEvent::MatchCancel(
                        matching::parse_match_cancel(&tokens)?,
                    )));
                }
                other => {
                    tracing::debug!(action = other.as_str(), "unhandled matching action");
                }
            }
        }
    }
}

/// Sending half, clonable across tasks.
#[derive(Clone)]
pub struct MatchingHandle {
    writer: FrameWriter,
}

impl MatchingHandle {
    /// Advisory stop. A failure to send means the connection is already
    /// going away, which is fine; the coordinator closes the transport
    /// regardless.
    pub async fn stop_matching(&self) {
        if let Err(e) = self.writer.send(matching::stop_matching_frame()).await {
            tracing::debug!(error = %e, "stop-matching send skipped, connection closing");
        }
    }

    /// Driver-only: accept a pending trip request. Fire-and-forget; the
    /// MATCH event, if it arrives, is the acknowledgement.
    pub async fn accept_trip(&self, passenger: &Profile) -> Result<(), ChannelError> {
        let frame = matching::trip_accept_frame(passenger)?;
        if let Err(e) = self.writer.send(frame).await {
            tracing::debug!(error = %e, "trip-accept send skipped, connection closing");
        }
        Ok(())
    }

    /// Tear down the transport. Idempotent.
    pub fn close(&self) {
        self.writer.close();
    }
}
