// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Data models for the real-time session protocols.

pub mod geo;
pub mod profile;
pub mod trip;
pub mod user_state;

pub use geo::{Point, RouteSegment};
pub use profile::{Profile, VehiclePreference};
pub use trip::{
    LocationBroadcast, PassengerTripDetails, PassengerTripStatus, TripRequest, TripSnapshot,
    TripStatus,
};
pub use user_state::{UserState, UserStatus};
