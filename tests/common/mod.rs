// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Shared test harness: an in-memory transport plus fixtures for the
//! wire payloads the server would send.

use futures_util::future::BoxFuture;
use ridelink::error::TransportError;
use ridelink::models::{
    PassengerTripDetails, PassengerTripStatus, Point, Profile, TripSnapshot, TripStatus,
    VehiclePreference,
};
use ridelink::transport::{Connection, Transport};
use ridelink::wire;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const FRAME_QUEUE_DEPTH: usize = 32;

/// In-memory [`Transport`]. Connections are scripted up front so the
/// test holds the server end before the client connects; an unscripted
/// connect fails.
#[derive(Default)]
#[allow(dead_code)]
pub struct MockTransport {
    scripts: Mutex<VecDeque<Script>>,
    connects: Mutex<Vec<(String, String)>>,
}

enum Script {
    Accept(Connection),
    Reject(TransportError),
}

impl MockTransport {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an accepted connection and return its server end.
    #[allow(dead_code)]
    pub fn expect_connection(&self) -> ServerEnd {
        let (out_tx, out_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let (in_tx, in_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let closer = CancellationToken::new();
        self.scripts
            .lock()
            .unwrap()
            .push_back(Script::Accept(Connection::new(
                out_tx,
                in_rx,
                closer.clone(),
            )));
        ServerEnd {
            sent: out_rx,
            push: Some(in_tx),
            closer,
        }
    }

    /// Script a rejected connection attempt.
    #[allow(dead_code)]
    pub fn expect_rejection(&self, error: TransportError) {
        self.scripts.lock().unwrap().push_back(Script::Reject(error));
    }

    /// Every `(path, bearer_token)` pair passed to `connect` so far.
    #[allow(dead_code)]
    pub fn connects(&self) -> Vec<(String, String)> {
        self.connects.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn connect(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> BoxFuture<'static, Result<Connection, TransportError>> {
        self.connects
            .lock()
            .unwrap()
            .push((path.to_string(), bearer_token.to_string()));
        let script = self.scripts.lock().unwrap().pop_front();
        Box::pin(async move {
            match script {
                Some(Script::Accept(connection)) => Ok(connection),
                Some(Script::Reject(error)) => Err(error),
                None => Err(TransportError::Connect("no scripted connection".into())),
            }
        })
    }
}

/// The server side of a scripted connection.
#[allow(dead_code)]
pub struct ServerEnd {
    sent: mpsc::Receiver<String>,
    push: Option<mpsc::Sender<Result<String, TransportError>>>,
    closer: CancellationToken,
}

#[allow(dead_code)]
impl ServerEnd {
    /// Deliver a frame to the client.
    pub async fn push(&self, frame: &str) {
        self.push
            .as_ref()
            .expect("connection already hung up")
            .send(Ok(frame.to_string()))
            .await
            .expect("client receiver gone");
    }

    /// Deliver a transport-level failure to the client.
    pub async fn fail(&self, error: TransportError) {
        self.push
            .as_ref()
            .expect("connection already hung up")
            .send(Err(error))
            .await
            .expect("client receiver gone");
    }

    /// Simulate the server closing the connection.
    pub fn hang_up(&mut self) {
        self.push = None;
    }

    /// Whether the client has torn the connection down.
    pub fn is_closed(&self) -> bool {
        self.closer.is_cancelled()
    }

    /// Next frame the client sent, or panic after a short wait.
    pub async fn sent(&mut self) -> String {
        within(self.sent.recv()).await.expect("client hung up")
    }

    /// Frame the client already sent, if any; never waits.
    pub fn try_sent(&mut self) -> Option<String> {
        self.sent.try_recv().ok()
    }

    /// Wait until the client tears the connection down.
    pub async fn closed(&self) {
        within(self.closer.cancelled()).await;
    }
}

/// Bound every await in tests; a hang is a failure, not a timeout.
#[allow(dead_code)]
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out waiting for the client")
}

/// Session store with a fixed token and an invalidation flag.
#[derive(Default)]
#[allow(dead_code)]
pub struct TestSessionStore {
    token: Mutex<Option<String>>,
    invalidated: std::sync::atomic::AtomicBool,
}

#[allow(dead_code)]
impl TestSessionStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
            invalidated: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn was_invalidated(&self) -> bool {
        self.invalidated.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl ridelink::SessionStore for TestSessionStore {
    fn current_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn cached_profile(&self) -> Option<Profile> {
        None
    }

    fn invalidate(&self) {
        self.token.lock().unwrap().take();
        self.invalidated
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

/// User-state source answering every query the same way.
#[allow(dead_code)]
pub enum ScriptedUserState {
    Idle,
    InTrip(String),
    Unreachable,
}

impl ridelink::UserStateSource for ScriptedUserState {
    fn current_state(&self) -> BoxFuture<'_, anyhow::Result<ridelink::models::UserState>> {
        use ridelink::models::{UserState, UserStatus};
        let result = match self {
            ScriptedUserState::Idle => Ok(UserState {
                status: UserStatus::Idle,
                trip_id: None,
            }),
            ScriptedUserState::InTrip(trip_id) => Ok(UserState {
                status: UserStatus::InTripAsPassenger,
                trip_id: Some(trip_id.clone()),
            }),
            ScriptedUserState::Unreachable => Err(anyhow::anyhow!("user-state query returned 401")),
        };
        Box::pin(async move { result })
    }
}

// --- Fixtures ---

#[allow(dead_code)]
pub fn profile(id: i64, name: &str) -> Profile {
    Profile {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        national_id: format!("31750{id:011}"),
        profile_picture_ref: "pic-1".to_string(),
        vehicle_picture_ref: "veh-1".to_string(),
        vehicle_preference: VehiclePreference::Car,
    }
}

#[allow(dead_code)]
pub fn passenger_details(status: PassengerTripStatus) -> PassengerTripDetails {
    PassengerTripDetails {
        pickup_point: Point::new(-8.1689, 113.7006),
        destination_point: Point::new(-8.17, 113.71),
        status,
    }
}

#[allow(dead_code)]
pub fn snapshot(
    trip_id: &str,
    driver: Profile,
    passengers: &[(Profile, PassengerTripStatus)],
    status: TripStatus,
) -> TripSnapshot {
    let passengers: HashMap<_, _> = passengers
        .iter()
        .map(|(profile, status)| (profile.clone(), passenger_details(*status)))
        .collect();
    TripSnapshot {
        trip_id: trip_id.to_string(),
        driver,
        passengers,
        status,
    }
}

// --- Server-sent frames ---

#[allow(dead_code)]
pub fn trip_request_frame(passenger: &Profile, pickup: &str, destination: &str, tariff: i64) -> String {
    format!(
        "TRIP_REQUEST {} {} {} {tariff}",
        wire::encode_token(passenger).unwrap(),
        wire::encode_text(pickup),
        wire::encode_text(destination),
    )
}

#[allow(dead_code)]
pub fn match_frame(trip_id: &str, counterpart: &Profile) -> String {
    format!("MATCH {trip_id} {}", wire::encode_token(counterpart).unwrap())
}

#[allow(dead_code)]
pub fn match_cancel_frame(passenger: &Profile) -> String {
    format!("MATCH_CANCEL {}", wire::encode_token(passenger).unwrap())
}

#[allow(dead_code)]
pub fn trip_state_frame(snapshot: &TripSnapshot) -> String {
    format!("TRIP_STATE_UPDATE {}", wire::encode_token(snapshot).unwrap())
}

#[allow(dead_code)]
pub fn polyline_frame(points: &[(f64, f64)]) -> String {
    // (latitude, longitude) pairs; polyline wants x = longitude.
    let line: geo::LineString<f64> =
        geo::LineString::from(points.iter().map(|(lat, lng)| (*lng, *lat)).collect::<Vec<_>>());
    let encoded = polyline::encode_coordinates(line, 5).unwrap();
    format!("POLYLINE_UPDATE {}", wire::encode_text(&encoded))
}

#[allow(dead_code)]
pub fn location_broadcast_frame(sender: &Profile, location: Point) -> String {
    format!(
        "LOCATION_BROADCAST {} {}",
        wire::encode_token(sender).unwrap(),
        wire::encode_token(&location).unwrap(),
    )
}
