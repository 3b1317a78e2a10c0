// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! The session coordinator: single owner of "what real-time activity is
//! the user engaged in".
//!
//! Holds at most one matching channel and one trip channel at a time.
//! Each channel's consume loop runs as its own cancellable task; state
//! mutations from one channel are therefore totally ordered. The UI (or
//! the background host) observes state through `watch` receivers and a
//! broadcast stream of connectivity errors.

use crate::channel::{
    MatchingChannel, MatchingEvent, MatchingHandle, MatchingRole, TripChannel, TripEvent,
    TripHandle,
};
use crate::models::{Point, Profile, TripRequest, TripSnapshot, VehiclePreference};
use crate::session::{SessionStore, UserStateSource};
use crate::transport::Transport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

const ERROR_STREAM_CAPACITY: usize = 16;

/// Ridesharing session coordinator. Cheap to clone; all clones share
/// the same state.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    user_state: Arc<dyn UserStateSource>,

    state: StateSenders,
    /// Connectivity errors for transient user display. Delivered
    /// at-most-once per occurrence, never retained.
    errors: broadcast::Sender<String>,

    /// Consume-loop tasks. Also serializes UI-driven transitions.
    tasks: Mutex<Tasks>,
    matching_handle: Mutex<Option<MatchingHandle>>,
    trip_handle: Mutex<Option<TripHandle>>,
}

struct StateSenders {
    is_matching: watch::Sender<bool>,
    trip_requests: watch::Sender<Vec<TripRequest>>,
    trip_snapshot: watch::Sender<Option<TripSnapshot>>,
    route_polyline: watch::Sender<Vec<Point>>,
    peer_locations: watch::Sender<HashMap<Profile, Point>>,
}

#[derive(Default)]
struct Tasks {
    matching: Option<JoinHandle<()>>,
    trip: Option<JoinHandle<()>>,
}

fn is_live(task: &Option<JoinHandle<()>>) -> bool {
    task.as_ref().is_some_and(|t| !t.is_finished())
}

impl SessionCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        user_state: Arc<dyn UserStateSource>,
    ) -> Self {
        let (errors, _) = broadcast::channel(ERROR_STREAM_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                user_state,
                state: StateSenders {
                    is_matching: watch::Sender::new(false),
                    trip_requests: watch::Sender::new(Vec::new()),
                    trip_snapshot: watch::Sender::new(None),
                    route_polyline: watch::Sender::new(Vec::new()),
                    peer_locations: watch::Sender::new(HashMap::new()),
                },
                errors,
                tasks: Mutex::new(Tasks::default()),
                matching_handle: Mutex::new(None),
                trip_handle: Mutex::new(None),
            }),
        }
    }

    // --- Observation ---

    pub fn watch_is_matching(&self) -> watch::Receiver<bool> {
        self.inner.state.is_matching.subscribe()
    }

    pub fn watch_trip_requests(&self) -> watch::Receiver<Vec<TripRequest>> {
        self.inner.state.trip_requests.subscribe()
    }

    pub fn watch_trip_snapshot(&self) -> watch::Receiver<Option<TripSnapshot>> {
        self.inner.state.trip_snapshot.subscribe()
    }

    pub fn watch_route_polyline(&self) -> watch::Receiver<Vec<Point>> {
        self.inner.state.route_polyline.subscribe()
    }

    pub fn watch_peer_locations(&self) -> watch::Receiver<HashMap<Profile, Point>> {
        self.inner.state.peer_locations.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.inner.errors.subscribe()
    }

    // --- Matching ---

    /// Start looking for a driver. No-op while already matching or in a
    /// trip.
    pub async fn start_matching_as_passenger(
        &self,
        vehicle: VehiclePreference,
        pickup: Point,
        destination: Point,
    ) {
        self.start_matching(MatchingRole::Passenger {
            vehicle,
            pickup,
            destination,
        })
        .await;
    }

    /// Start looking for passengers along a declared route. No-op while
    /// already matching or in a trip, and rejects degenerate input
    /// (fewer than two route points, zero slots).
    pub async fn start_matching_as_driver(&self, route: Vec<Point>, available_slots: u32) {
        if route.len() < 2 || available_slots == 0 {
            tracing::warn!(
                points = route.len(),
                slots = available_slots,
                "rejecting driver registration with degenerate input"
            );
            return;
        }
        self.start_matching(MatchingRole::Driver {
            route,
            available_slots,
        })
        .await;
    }

    async fn start_matching(&self, role: MatchingRole) {
        let mut tasks = self.inner.tasks.lock().await;
        if is_live(&tasks.matching) {
            return;
        }
        if is_live(&tasks.trip) {
            // UI is responsible for not offering this; guard defensively.
            tracing::warn!("matching requested while a trip is active, ignoring");
            return;
        }

        self.inner.state.is_matching.send_replace(true);
        self.inner.state.trip_requests.send_replace(Vec::new());

        let inner = self.inner.clone();
        tasks.matching = Some(tokio::spawn(async move {
            Inner::run_matching(inner, role).await;
        }));
    }

    /// Stop matching: advisory `STOP_MATCHING`, close the transport,
    /// cancel the consume task and wait for it to actually terminate,
    /// then clear matching state. Idempotent: a second call finds
    /// nothing to stop and sends nothing.
    pub async fn stop_matching(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        {
            let mut handle = self.inner.matching_handle.lock().await;
            if let Some(handle) = handle.take() {
                handle.stop_matching().await;
                handle.close();
            }
        }
        if let Some(task) = tasks.matching.take() {
            task.abort();
            // The join prevents a late in-flight event from resurrecting
            // state after we clear it below.
            let _ = task.await;
        }
        self.inner.state.is_matching.send_replace(false);
        self.inner.state.trip_requests.send_replace(Vec::new());
    }

    /// Driver-only: accept a pending request and drop it locally by
    /// passenger identity. No-op when not matching.
    pub async fn accept_trip(&self, passenger: &Profile) {
        {
            let handle = self.inner.matching_handle.lock().await;
            if let Some(handle) = handle.as_ref() {
                if let Err(e) = handle.accept_trip(passenger).await {
                    tracing::warn!(error = %e, "failed to encode trip accept");
                    return;
                }
            }
        }
        self.inner
            .state
            .trip_requests
            .send_modify(|requests| requests.retain(|r| &r.passenger != passenger));
    }

    // --- Trip ---

    /// Connect to an active trip. No-op while a trip connection task is
    /// already live.
    pub async fn connect_to_trip(&self, trip_id: &str) {
        let mut tasks = self.inner.tasks.lock().await;
        Inner::spawn_trip(&self.inner, &mut tasks, trip_id);
    }

    /// Explicit local detach, mirroring [`Self::stop_matching`]'s join
    /// discipline. Clears all trip state unconditionally.
    pub async fn disconnect_from_trip(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        {
            let mut handle = self.inner.trip_handle.lock().await;
            if let Some(handle) = handle.take() {
                handle.close();
            }
        }
        if let Some(task) = tasks.trip.take() {
            task.abort();
            let _ = task.await;
        }
        self.inner.clear_trip_state();
    }

    /// Pass-through; no-op without an active trip.
    pub async fn send_location(&self, location: Point) {
        let handle = self.inner.trip_handle.lock().await;
        if let Some(handle) = handle.as_ref() {
            if let Err(e) = handle.send_location(location).await {
                tracing::warn!(error = %e, "failed to encode location update");
            }
        }
    }

    /// Pass-through; no-op without an active trip.
    pub async fn pickup_passenger(&self, passenger: &Profile) {
        let handle = self.inner.trip_handle.lock().await;
        if let Some(handle) = handle.as_ref() {
            if let Err(e) = handle.pickup_passenger(passenger).await {
                tracing::warn!(error = %e, "failed to encode pickup");
            }
        }
    }

    /// Pass-through; no-op without an active trip.
    pub async fn dropoff_passenger(&self, passenger: &Profile) {
        let handle = self.inner.trip_handle.lock().await;
        if let Some(handle) = handle.as_ref() {
            if let Err(e) = handle.dropoff_passenger(passenger).await {
                tracing::warn!(error = %e, "failed to encode dropoff");
            }
        }
    }

    /// Pass-through; no-op without an active trip.
    pub async fn request_trip_cancellation(&self) {
        let handle = self.inner.trip_handle.lock().await;
        if let Some(handle) = handle.as_ref() {
            handle.request_cancellation().await;
        }
    }

    // --- Activation ---

    /// On first activation: ask the server what the user is doing and
    /// reconnect to a reported active trip. An unreachable or
    /// unauthenticated state query is treated as a forced logout.
    pub async fn check_initial_state(&self) {
        {
            let tasks = self.inner.tasks.lock().await;
            if is_live(&tasks.matching) || is_live(&tasks.trip) {
                return;
            }
        }
        match self.inner.user_state.current_state().await {
            Ok(state) if state.status.is_in_trip() => {
                if let Some(trip_id) = state.trip_id {
                    tracing::info!(trip_id = %trip_id, "resuming active trip");
                    let mut tasks = self.inner.tasks.lock().await;
                    Inner::spawn_trip(&self.inner, &mut tasks, &trip_id);
                }
            }
            Ok(_) => {
                tracing::info!("user is idle, no active trip");
            }
            Err(e) => {
                self.inner.session.invalidate();
                self.inner.emit_error(e.to_string());
            }
        }
    }
}

impl Inner {
    /// Consume the matching channel until it terminates, then clear
    /// matching state and, on a MATCH, transition into the trip.
    async fn run_matching(inner: Arc<Inner>, role: MatchingRole) {
        let token = inner.session.current_token().unwrap_or_default();

        let outcome: Result<Option<String>, crate::error::ChannelError> = async {
            let (mut events, handle) =
                MatchingChannel::open(inner.transport.as_ref(), &token, &role).await?;
            *inner.matching_handle.lock().await = Some(handle);

            let mut matched_trip = None;
            while let Some(event) = events.next().await? {
                match event {
                    MatchingEvent::TripRequest(request) => {
                        inner.state.trip_requests.send_modify(|requests| {
                            // Latest request per passenger identity wins;
                            // insertion order is display order.
                            requests.retain(|r| r.passenger != request.passenger);
                            requests.push(request);
                        });
                    }
                    MatchingEvent::Match { trip_id, .. } => {
                        matched_trip = Some(trip_id);
                    }
                    MatchingEvent::MatchCancel(passenger) => {
                        inner.state.trip_requests.send_modify(|requests| {
                            requests.retain(|r| r.passenger != passenger);
                        });
                    }
                }
            }
            Ok(matched_trip)
        }
        .await;

        if let Some(handle) = inner.matching_handle.lock().await.take() {
            handle.close();
        }
        inner.state.is_matching.send_replace(false);
        inner.state.trip_requests.send_replace(Vec::new());

        match outcome {
            Ok(Some(trip_id)) => {
                let mut tasks = inner.tasks.lock().await;
                Inner::spawn_trip(&inner, &mut tasks, &trip_id);
            }
            Ok(None) => {
                tracing::info!("matching ended without a match");
            }
            Err(e) if e.is_unauthorized() => {
                inner.session.invalidate();
                inner.emit_error(
                    "Signed in on another device. Log in again to continue".to_string(),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "matching channel failed");
                inner.emit_error(format!("Failed to find a match: {e}"));
            }
        }
    }

    fn spawn_trip(inner: &Arc<Inner>, tasks: &mut Tasks, trip_id: &str) {
        if is_live(&tasks.trip) {
            return;
        }
        let inner = inner.clone();
        let trip_id = trip_id.to_string();
        tasks.trip = Some(tokio::spawn(async move {
            Inner::run_trip(inner, trip_id).await;
        }));
    }

    /// Consume the trip channel until it terminates. Whatever the
    /// reason (remote completion, cancellation, error, or local
    /// detach), all trip state is cleared; it must never go stale.
    async fn run_trip(inner: Arc<Inner>, trip_id: String) {
        let token = inner.session.current_token().unwrap_or_default();

        let outcome: Result<(), crate::error::ChannelError> = async {
            let (mut events, handle) =
                TripChannel::open(inner.transport.as_ref(), &token, &trip_id).await?;
            *inner.trip_handle.lock().await = Some(handle);

            while let Some(event) = events.next().await? {
                match event {
                    TripEvent::StateUpdate(snapshot) => {
                        inner.state.trip_snapshot.send_replace(Some(snapshot));
                    }
                    TripEvent::Polyline(points) => {
                        inner.state.route_polyline.send_replace(points);
                    }
                    TripEvent::Location(broadcast) => {
                        inner.state.peer_locations.send_modify(|locations| {
                            locations.insert(broadcast.sender, broadcast.location);
                        });
                    }
                    TripEvent::CancelRequested => {
                        tracing::info!("a participant requested cancellation");
                    }
                }
            }
            Ok(())
        }
        .await;

        if let Some(handle) = inner.trip_handle.lock().await.take() {
            handle.close();
        }
        inner.clear_trip_state();

        if let Err(e) = outcome {
            tracing::error!(error = %e, trip_id = %trip_id, "trip connection lost");
            inner.emit_error(format!("Trip connection lost: {e}"));
        } else {
            tracing::info!(trip_id = %trip_id, "trip connection closed");
        }
    }

    fn clear_trip_state(&self) {
        self.state.trip_snapshot.send_replace(None);
        self.state.peer_locations.send_replace(HashMap::new());
        self.state.route_polyline.send_replace(Vec::new());
    }

    fn emit_error(&self, message: String) {
        // No receivers is fine; errors are transient, not retained.
        let _ = self.errors.send(message);
    }
}
