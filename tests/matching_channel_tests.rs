// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Matching channel behavior against a scripted transport.

mod common;

use common::{profile, within, MockTransport};
use ridelink::channel::{MatchingChannel, MatchingEvent, MatchingRole};
use ridelink::error::TransportError;
use ridelink::models::{Point, VehiclePreference};
use ridelink::wire;

fn passenger_role() -> MatchingRole {
    MatchingRole::Passenger {
        vehicle: VehiclePreference::Car,
        pickup: Point::new(-8.1689, 113.7006),
        destination: Point::new(-8.17, 113.71),
    }
}

fn driver_role() -> MatchingRole {
    MatchingRole::Driver {
        route: vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)],
        available_slots: 2,
    }
}

#[tokio::test]
async fn test_open_authenticates_and_registers() {
    let transport = MockTransport::new();
    let mut server = transport.expect_connection();

    let (_events, _handle) = MatchingChannel::open(&transport, "tok-1", &passenger_role())
        .await
        .unwrap();

    assert_eq!(
        transport.connects(),
        vec![("/routing/matching".to_string(), "tok-1".to_string())]
    );
    let frame = server.sent().await;
    assert!(frame.starts_with("REGISTER_PASSENGER "));
}

#[tokio::test]
async fn test_driver_receives_requests_and_cancellations() {
    let transport = MockTransport::new();
    let server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &driver_role())
        .await
        .unwrap();

    let sari = profile(2, "Sari");
    server
        .push(&common::trip_request_frame(&sari, "Jl. A", "Jl. B", 12000))
        .await;
    server.push(&common::match_cancel_frame(&sari)).await;

    match within(events.next()).await.unwrap() {
        Some(MatchingEvent::TripRequest(request)) => {
            assert_eq!(request.passenger, sari);
            assert_eq!(request.tariff, 12000);
        }
        other => panic!("expected a trip request, got {other:?}"),
    }
    match within(events.next()).await.unwrap() {
        Some(MatchingEvent::MatchCancel(passenger)) => assert_eq!(passenger, sari),
        other => panic!("expected a cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_match_is_terminal() {
    let transport = MockTransport::new();
    let server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &passenger_role())
        .await
        .unwrap();

    let driver = profile(1, "Budi");
    server.push(&common::match_frame("t1", &driver)).await;
    // A late frame after the match must never surface.
    server
        .push(&common::trip_request_frame(&profile(5, "Eko"), "a", "b", 1))
        .await;

    match within(events.next()).await.unwrap() {
        Some(MatchingEvent::Match {
            trip_id,
            counterpart,
        }) => {
            assert_eq!(trip_id, "t1");
            assert_eq!(counterpart, driver);
        }
        other => panic!("expected a match, got {other:?}"),
    }
    assert!(server.is_closed());
    assert!(within(events.next()).await.unwrap().is_none());
    assert!(within(events.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_action_is_skipped() {
    let transport = MockTransport::new();
    let server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &driver_role())
        .await
        .unwrap();

    server.push("FOO bar baz").await;
    let sari = profile(2, "Sari");
    server
        .push(&common::trip_request_frame(&sari, "a", "b", 5000))
        .await;

    match within(events.next()).await.unwrap() {
        Some(MatchingEvent::TripRequest(request)) => assert_eq!(request.passenger, sari),
        other => panic!("expected the frame after the junk, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_bound_actions_from_server_are_ignored() {
    let transport = MockTransport::new();
    let server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &driver_role())
        .await
        .unwrap();

    server.push("STOP_MATCHING").await;
    server.push(&common::match_frame("t9", &profile(1, "Budi"))).await;

    match within(events.next()).await.unwrap() {
        Some(MatchingEvent::Match { trip_id, .. }) => assert_eq!(trip_id, "t9"),
        other => panic!("expected the match, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stop_matching_is_advisory_after_close() {
    let transport = MockTransport::new();
    let mut server = transport.expect_connection();

    let (_events, handle) = MatchingChannel::open(&transport, "tok", &passenger_role())
        .await
        .unwrap();
    let _ = server.sent().await; // registration

    handle.stop_matching().await;
    assert_eq!(server.sent().await, "STOP_MATCHING");

    handle.close();
    handle.stop_matching().await;
    assert!(server.try_sent().is_none());
}

#[tokio::test]
async fn test_accept_trip_sends_the_passenger_identity() {
    let transport = MockTransport::new();
    let mut server = transport.expect_connection();

    let (_events, handle) = MatchingChannel::open(&transport, "tok", &driver_role())
        .await
        .unwrap();
    let _ = server.sent().await; // registration

    let sari = profile(2, "Sari");
    handle.accept_trip(&sari).await.unwrap();

    let frame = server.sent().await;
    let (action, tokens) = wire::split_frame(&frame);
    assert_eq!(action, "TRIP_ACCEPT");
    let accepted: ridelink::models::Profile = wire::decode_token(tokens[0]).unwrap();
    assert_eq!(accepted, sari);
}

#[tokio::test]
async fn test_unauthorized_handshake_surfaces() {
    let transport = MockTransport::new();
    transport.expect_rejection(TransportError::Unauthorized);

    let Err(err) = MatchingChannel::open(&transport, "stale", &passenger_role()).await else {
        panic!("expected the handshake to be rejected");
    };
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_remote_close_finishes_the_stream() {
    let transport = MockTransport::new();
    let mut server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &passenger_role())
        .await
        .unwrap();

    server.hang_up();
    assert!(within(events.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transport_error_terminates_with_error() {
    let transport = MockTransport::new();
    let server = transport.expect_connection();

    let (mut events, _handle) = MatchingChannel::open(&transport, "tok", &passenger_role())
        .await
        .unwrap();

    server.fail(TransportError::Io("reset by peer".into())).await;
    assert!(within(events.next()).await.is_err());
}
