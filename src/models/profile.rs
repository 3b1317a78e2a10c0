// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! User profile as received from the server.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// The role/vehicle a user registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehiclePreference {
    Passenger,
    Car,
    Motorcycle,
}

impl VehiclePreference {
    /// Wire token, as embedded in `REGISTER_PASSENGER` frames.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehiclePreference::Passenger => "PASSENGER",
            VehiclePreference::Car => "CAR",
            VehiclePreference::Motorcycle => "MOTORCYCLE",
        }
    }
}

impl std::fmt::Display for VehiclePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's profile. Immutable once received; the coordinator only ever
/// replaces references to it.
///
/// Equality and hashing use the identity key `(id, email)` only; two
/// profiles with the same identity are the same user even if display
/// fields differ between snapshots.
///
/// JSON field names follow the deployed wire format (`uid`, `nik`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Server-assigned user id (identity key)
    #[serde(rename = "uid")]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address (defensive second identity key)
    pub email: String,
    /// National identity number
    #[serde(rename = "nik")]
    pub national_id: String,
    /// Server-side reference to the profile picture
    #[serde(rename = "profilePictureId")]
    pub profile_picture_ref: String,
    /// Server-side reference to the vehicle picture
    #[serde(rename = "vehicleImageId")]
    pub vehicle_picture_ref: String,
    #[serde(rename = "vehiclePreference")]
    pub vehicle_preference: VehiclePreference,
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.email == other.email
    }
}

impl Eq for Profile {}

impl Hash for Profile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.email.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, email: &str, name: &str) -> Profile {
        Profile {
            id,
            name: name.to_string(),
            email: email.to_string(),
            national_id: "1234567890123456".to_string(),
            profile_picture_ref: "pp-1".to_string(),
            vehicle_picture_ref: "vp-1".to_string(),
            vehicle_preference: VehiclePreference::Motorcycle,
        }
    }

    #[test]
    fn test_identity_equality_ignores_display_fields() {
        let a = profile(7, "a@example.com", "Alice");
        let b = profile(7, "a@example.com", "Alice (renamed)");
        assert_eq!(a, b);

        let c = profile(8, "a@example.com", "Alice");
        assert_ne!(a, c);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(profile(7, "a@example.com", "Alice")).unwrap();
        assert_eq!(json["uid"], 7);
        assert_eq!(json["nik"], "1234567890123456");
        assert_eq!(json["profilePictureId"], "pp-1");
        assert_eq!(json["vehicleImageId"], "vp-1");
        assert_eq!(json["vehiclePreference"], "MOTORCYCLE");
    }
}
