// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Message encoding and parsing for the matching socket.

use crate::error::CodecError;
use crate::models::{Point, Profile, RouteSegment, TripRequest, VehiclePreference};
use crate::wire;
use std::fmt::Write as _;
use std::str::FromStr;

/// Every action name the matching endpoint can carry, in either
/// direction. `UPDATE_DRIVER_ROUTE` is reserved by the protocol and
/// currently unhandled on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingAction {
    RegisterDriver,
    RegisterPassenger,
    TripRequest,
    TripAccept,
    Match,
    MatchCancel,
    StopMatching,
    UpdateDriverRoute,
}

impl MatchingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingAction::RegisterDriver => "REGISTER_DRIVER",
            MatchingAction::RegisterPassenger => "REGISTER_PASSENGER",
            MatchingAction::TripRequest => "TRIP_REQUEST",
            MatchingAction::TripAccept => "TRIP_ACCEPT",
            MatchingAction::Match => "MATCH",
            MatchingAction::MatchCancel => "MATCH_CANCEL",
            MatchingAction::StopMatching => "STOP_MATCHING",
            MatchingAction::UpdateDriverRoute => "UPDATE_DRIVER_ROUTE",
        }
    }
}

impl FromStr for MatchingAction {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTER_DRIVER" => Ok(MatchingAction::RegisterDriver),
            "REGISTER_PASSENGER" => Ok(MatchingAction::RegisterPassenger),
            "TRIP_REQUEST" => Ok(MatchingAction::TripRequest),
            "TRIP_ACCEPT" => Ok(MatchingAction::TripAccept),
            "MATCH" => Ok(MatchingAction::Match),
            "MATCH_CANCEL" => Ok(MatchingAction::MatchCancel),
            "STOP_MATCHING" => Ok(MatchingAction::StopMatching),
            "UPDATE_DRIVER_ROUTE" => Ok(MatchingAction::UpdateDriverRoute),
            other => Err(CodecError::UnknownAction(other.to_string())),
        }
    }
}

/// `REGISTER_PASSENGER <vehicle> <b64(json(pickup))> <b64(json(destination))>`
pub fn register_passenger_frame(
    vehicle: VehiclePreference,
    pickup: Point,
    destination: Point,
) -> Result<String, CodecError> {
    Ok(wire::join_frame(
        MatchingAction::RegisterPassenger.as_str(),
        &[
            vehicle.as_str(),
            &wire::encode_token(&pickup)?,
            &wire::encode_token(&destination)?,
        ],
    ))
}

/// `REGISTER_DRIVER <slots> <lat,lng:lat,lng> ...`
///
/// The segment tokens deliberately bypass the base64 convention: the
/// data is already whitespace-free. Floats use `{:?}` formatting so
/// integral coordinates keep their trailing `.0`, which the server
/// expects.
pub fn register_driver_frame(route: &[RouteSegment], available_slots: u32) -> String {
    let mut frame = format!(
        "{} {}",
        MatchingAction::RegisterDriver.as_str(),
        available_slots
    );
    for seg in route {
        let _ = write!(
            frame,
            " {:?},{:?}:{:?},{:?}",
            seg.start.latitude, seg.start.longitude, seg.end.latitude, seg.end.longitude
        );
    }
    frame
}

/// `TRIP_ACCEPT <b64(json(profile))>`
pub fn trip_accept_frame(passenger: &Profile) -> Result<String, CodecError> {
    Ok(wire::join_frame(
        MatchingAction::TripAccept.as_str(),
        &[&wire::encode_token(passenger)?],
    ))
}

/// `STOP_MATCHING` (no payload, advisory)
pub fn stop_matching_frame() -> String {
    MatchingAction::StopMatching.as_str().to_string()
}

/// Parse `TRIP_REQUEST <b64Profile> <b64Address> <b64Address> <tariff>`.
pub fn parse_trip_request(tokens: &[&str]) -> Result<TripRequest, CodecError> {
    const ACTION: &str = "TRIP_REQUEST";
    Ok(TripRequest {
        passenger: wire::decode_token(wire::required(tokens, 0, ACTION)?)?,
        pickup_address: wire::decode_text(wire::required(tokens, 1, ACTION)?)?,
        destination_address: wire::decode_text(wire::required(tokens, 2, ACTION)?)?,
        tariff: wire::decode_int(wire::required(tokens, 3, ACTION)?)?,
    })
}

/// Parse `MATCH <tripId> <b64Profile>`.
pub fn parse_match(tokens: &[&str]) -> Result<(String, Profile), CodecError> {
    const ACTION: &str = "MATCH";
    let trip_id = wire::required(tokens, 0, ACTION)?.to_string();
    let counterpart = wire::decode_token(wire::required(tokens, 1, ACTION)?)?;
    Ok((trip_id, counterpart))
}

/// Parse `MATCH_CANCEL <b64Profile>`.
pub fn parse_match_cancel(tokens: &[&str]) -> Result<Profile, CodecError> {
    wire::decode_token(wire::required(tokens, 0, "MATCH_CANCEL")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_driver_frame_format() {
        let route = RouteSegment::from_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ]);
        let frame = register_driver_frame(&route, 2);
        assert_eq!(frame, "REGISTER_DRIVER 2 0.0,0.0:0.0,1.0 0.0,1.0:1.0,1.0");
    }

    #[test]
    fn test_register_driver_keeps_fractional_digits() {
        let route = RouteSegment::from_polyline(&[
            Point::new(-8.1689, 113.7006),
            Point::new(-8.17, 113.71),
        ]);
        let frame = register_driver_frame(&route, 1);
        assert_eq!(frame, "REGISTER_DRIVER 1 -8.1689,113.7006:-8.17,113.71");
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in [
            MatchingAction::RegisterDriver,
            MatchingAction::RegisterPassenger,
            MatchingAction::TripRequest,
            MatchingAction::TripAccept,
            MatchingAction::Match,
            MatchingAction::MatchCancel,
            MatchingAction::StopMatching,
            MatchingAction::UpdateDriverRoute,
        ] {
            assert_eq!(action.as_str().parse::<MatchingAction>().unwrap(), action);
        }
        assert!("FOO".parse::<MatchingAction>().is_err());
        assert!("".parse::<MatchingAction>().is_err());
    }
}
