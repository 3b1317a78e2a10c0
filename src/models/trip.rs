// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Trip state as pushed by the server, plus the driver-side pending
//! trip request.

use crate::models::geo::Point;
use crate::models::profile::Profile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-passenger progress within a trip.
///
/// Monotonic: WAITING_FOR_PICKUP → IN_TRANSIT → DROPPED_OFF. Only ever
/// mutated by authoritative `TRIP_STATE_UPDATE` snapshots, never guessed
/// locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerTripStatus {
    WaitingForPickup,
    InTransit,
    DroppedOff,
}

/// Overall trip status. Authoritative transitions come only from the
/// server; COMPLETED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    AwaitingParticipants,
    EnRouteToPickup,
    Reconnecting,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

/// Pickup/destination and progress for one passenger in a trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerTripDetails {
    pub pickup_point: Point,
    pub destination_point: Point,
    pub status: PassengerTripStatus,
}

/// Complete, authoritative trip state. Each `TRIP_STATE_UPDATE` replaces
/// the previous snapshot wholesale; snapshots are never diffed or merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub trip_id: String,
    pub driver: Profile,
    /// The server serializes this profile-keyed map as a flat
    /// `[key, value, key, value, ...]` JSON array.
    #[serde(with = "flat_pairs")]
    pub passengers: HashMap<Profile, PassengerTripDetails>,
    pub status: TripStatus,
}

/// Driver-side pending request from a candidate passenger. Ephemeral:
/// removed when accepted, cancelled, or the matching session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub passenger: Profile,
    pub pickup_address: String,
    pub destination_address: String,
    pub tariff: i64,
}

/// A single participant location update. The coordinator retains only the
/// latest broadcast per sender identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationBroadcast {
    pub sender: Profile,
    pub location: Point,
}

/// Serde adapter for maps the server encodes as a flat JSON array of
/// alternating keys and values.
mod flat_pairs {
    use serde::de::{SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;
    use std::hash::Hash;
    use std::marker::PhantomData;

    pub fn serialize<K, V, S>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(map.len() * 2))?;
        for (key, value) in map {
            seq.serialize_element(key)?;
            seq.serialize_element(value)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Eq + Hash,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct FlatPairsVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for FlatPairsVisitor<K, V>
        where
            K: Deserialize<'de> + Eq + Hash,
            V: Deserialize<'de>,
        {
            type Value = HashMap<K, V>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a flat array of alternating keys and values")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut map = HashMap::new();
                while let Some(key) = seq.next_element::<K>()? {
                    let value = seq.next_element::<V>()?.ok_or_else(|| {
                        serde::de::Error::custom("key without a matching value")
                    })?;
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_seq(FlatPairsVisitor(PhantomData))
    }
}
