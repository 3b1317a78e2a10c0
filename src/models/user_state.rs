// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Server-reported user activity state, returned by `GET /users/state`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Idle,
    InTripAsDriver,
    InTripAsPassenger,
}

impl UserStatus {
    pub fn is_in_trip(&self) -> bool {
        matches!(
            self,
            UserStatus::InTripAsDriver | UserStatus::InTripAsPassenger
        )
    }
}

/// Response body of the user-state query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserState {
    pub status: UserStatus,
    #[serde(rename = "tripId", default)]
    pub trip_id: Option<String>,
}
