// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Socket session objects for the two real-time protocols.
//!
//! A channel owns one authenticated connection, sends its registration
//! or join frame on open, and exposes a lazy event sequence plus a send
//! handle. Event sequences are finite per connection; the caller must
//! reconnect (a new channel) to resume.

pub mod matching;
pub mod trip;

pub use matching::{MatchingChannel, MatchingEvent, MatchingEvents, MatchingHandle, MatchingRole};
pub use trip::{TripChannel, TripEvent, TripEvents, TripHandle};

/// Path of the matching endpoint.
pub const MATCHING_PATH: &str = "/routing/matching";

/// Path of the trip endpoint.
pub const TRIP_PATH: &str = "/routing/trip";
