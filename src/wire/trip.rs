// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Message encoding and parsing for the trip socket.

use crate::error::CodecError;
use crate::models::{LocationBroadcast, Point, Profile, TripSnapshot};
use crate::wire;
use std::str::FromStr;

/// Every action name the trip endpoint can carry, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripAction {
    JoinTrip,
    UpdateLocation,
    PickupPassenger,
    DropoffPassenger,
    UpdateCancellation,
    TripStateUpdate,
    PolylineUpdate,
    LocationBroadcast,
    Error,
    CancelRequestBroadcast,
}

impl TripAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripAction::JoinTrip => "JOIN_TRIP",
            TripAction::UpdateLocation => "UPDATE_LOCATION",
            TripAction::PickupPassenger => "PICKUP_PASSENGER",
            TripAction::DropoffPassenger => "DROPOFF_PASSENGER",
            TripAction::UpdateCancellation => "UPDATE_CANCELLATION",
            TripAction::TripStateUpdate => "TRIP_STATE_UPDATE",
            TripAction::PolylineUpdate => "POLYLINE_UPDATE",
            TripAction::LocationBroadcast => "LOCATION_BROADCAST",
            TripAction::Error => "ERROR",
            TripAction::CancelRequestBroadcast => "CANCEL_REQUEST_BROADCAST",
        }
    }
}

impl FromStr for TripAction {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOIN_TRIP" => Ok(TripAction::JoinTrip),
            "UPDATE_LOCATION" => Ok(TripAction::UpdateLocation),
            "PICKUP_PASSENGER" => Ok(TripAction::PickupPassenger),
            "DROPOFF_PASSENGER" => Ok(TripAction::DropoffPassenger),
            "UPDATE_CANCELLATION" => Ok(TripAction::UpdateCancellation),
            "TRIP_STATE_UPDATE" => Ok(TripAction::TripStateUpdate),
            "POLYLINE_UPDATE" => Ok(TripAction::PolylineUpdate),
            "LOCATION_BROADCAST" => Ok(TripAction::LocationBroadcast),
            "ERROR" => Ok(TripAction::Error),
            "CANCEL_REQUEST_BROADCAST" => Ok(TripAction::CancelRequestBroadcast),
            other => Err(CodecError::UnknownAction(other.to_string())),
        }
    }
}

/// `JOIN_TRIP <tripId>`
pub fn join_trip_frame(trip_id: &str) -> String {
    wire::join_frame(TripAction::JoinTrip.as_str(), &[trip_id])
}

/// `UPDATE_LOCATION <b64(json(point))>`
pub fn update_location_frame(location: Point) -> Result<String, CodecError> {
    Ok(wire::join_frame(
        TripAction::UpdateLocation.as_str(),
        &[&wire::encode_token(&location)?],
    ))
}

/// `PICKUP_PASSENGER <b64(json(profile))>` / `DROPOFF_PASSENGER <...>`
pub fn passenger_action_frame(
    action: TripAction,
    passenger: &Profile,
) -> Result<String, CodecError> {
    Ok(wire::join_frame(
        action.as_str(),
        &[&wire::encode_token(passenger)?],
    ))
}

/// `UPDATE_CANCELLATION` (no payload; the server decides when the
/// cancellation is mutual).
pub fn cancellation_request_frame() -> String {
    TripAction::UpdateCancellation.as_str().to_string()
}

/// Parse `TRIP_STATE_UPDATE <b64(json(snapshot))>`.
pub fn parse_trip_state(tokens: &[&str]) -> Result<TripSnapshot, CodecError> {
    wire::decode_token(wire::required(tokens, 0, "TRIP_STATE_UPDATE")?)
}

/// Parse `POLYLINE_UPDATE <b64(encodedPolyline)>` into the displayed
/// route (precision-5 polyline encoding, like the rest of the stack).
pub fn parse_polyline_update(tokens: &[&str]) -> Result<Vec<Point>, CodecError> {
    let encoded = wire::decode_text(wire::required(tokens, 0, "POLYLINE_UPDATE")?)?;
    let line = polyline::decode_polyline(&encoded, 5)
        .map_err(|e| CodecError::Polyline(e.to_string()))?;
    Ok(line.coords().map(|c| Point::from(*c)).collect())
}

/// Parse `LOCATION_BROADCAST <b64Profile> <b64Point>`.
pub fn parse_location_broadcast(tokens: &[&str]) -> Result<LocationBroadcast, CodecError> {
    const ACTION: &str = "LOCATION_BROADCAST";
    Ok(LocationBroadcast {
        sender: wire::decode_token(wire::required(tokens, 0, ACTION)?)?,
        location: wire::decode_token(wire::required(tokens, 1, ACTION)?)?,
    })
}

/// Extract the free-text message of an `ERROR` frame.
pub fn parse_error_message(tokens: &[&str]) -> String {
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_trip_frame() {
        assert_eq!(join_trip_frame("t1"), "JOIN_TRIP t1");
    }

    #[test]
    fn test_polyline_update_round_trip() {
        let line: geo::LineString<f64> = geo::LineString::from(vec![
            // x = longitude, y = latitude
            (113.7006, -8.1689),
            (113.71, -8.17),
        ]);
        let encoded = polyline::encode_coordinates(line, 5).unwrap();
        let token = wire::encode_text(&encoded);

        let points = parse_polyline_update(&[&token]).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].latitude - -8.1689).abs() < 1e-5);
        assert!((points[0].longitude - 113.7006).abs() < 1e-5);
    }

    #[test]
    fn test_error_message_preserves_spaces() {
        let (action, tokens) = wire::split_frame("ERROR server overloaded");
        assert_eq!(action.parse::<TripAction>().unwrap(), TripAction::Error);
        assert_eq!(parse_error_message(&tokens), "server overloaded");
    }

    #[test]
    fn test_invalid_polyline_is_fatal() {
        // Valid base64, but not a decodable polyline.
        let token = wire::encode_text("\u{7f}\u{7f}\u{7f}");
        assert!(matches!(
            parse_polyline_update(&[&token]),
            Err(CodecError::Polyline(_))
        ));
    }
}
