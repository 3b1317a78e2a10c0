// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Background execution host: keeps the coordinator observed while no
//! UI is attached and turns state transitions into user-visible
//! notifications.
//!
//! The host owns no coordinator state, only subscriptions. Cancel the
//! returned task to shut it down.

use crate::coordinator::SessionCoordinator;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    /// Matching started ("finding a match").
    Searching,
    /// A candidate passenger requested a ride (driver side).
    TripRequestReceived,
    /// A trip is underway.
    TripActive,
    /// All real-time activity has ended.
    Idle,
    /// A connectivity failure the user should see once.
    ConnectivityError(String),
}

/// Presentation seam for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &HostNotification);
}

/// Production notifier that logs notifications.
#[derive(Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &HostNotification) {
        match notification {
            HostNotification::ConnectivityError(message) => {
                tracing::warn!(message = %message, "connectivity problem");
            }
            other => tracing::info!(notification = ?other, "session update"),
        }
    }
}

/// Watches the coordinator and forwards transitions to a [`Notifier`].
pub struct BackgroundHost {
    coordinator: SessionCoordinator,
    notifier: Arc<dyn Notifier>,
}

impl BackgroundHost {
    pub fn new(coordinator: SessionCoordinator, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            coordinator,
            notifier,
        }
    }

    /// Spawn the observation loop. The host keeps its coordinator clone
    /// (and with it the watch senders) alive, so the loop runs until
    /// the returned handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut is_matching = self.coordinator.watch_is_matching();
        let mut trip_requests = self.coordinator.watch_trip_requests();
        let mut trip_snapshot = self.coordinator.watch_trip_snapshot();
        let mut errors = self.coordinator.subscribe_errors();

        let mut request_count = trip_requests.borrow().len();
        let mut trip_active = trip_snapshot.borrow().is_some();
        let mut matching = *is_matching.borrow();

        loop {
            tokio::select! {
                changed = is_matching.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let now = *is_matching.borrow_and_update();
                    if now && !matching {
                        self.notifier.notify(&HostNotification::Searching);
                    } else if !now && matching && trip_snapshot.borrow().is_none() {
                        self.notifier.notify(&HostNotification::Idle);
                    }
                    matching = now;
                }
                changed = trip_requests.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let count = trip_requests.borrow_and_update().len();
                    if count > request_count {
                        self.notifier.notify(&HostNotification::TripRequestReceived);
                    }
                    request_count = count;
                }
                changed = trip_snapshot.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let present = trip_snapshot.borrow_and_update().is_some();
                    if present && !trip_active {
                        self.notifier.notify(&HostNotification::TripActive);
                    } else if !present && trip_active && !*is_matching.borrow() {
                        self.notifier.notify(&HostNotification::Idle);
                    }
                    trip_active = present;
                }
                error = errors.recv() => match error {
                    Ok(message) => {
                        self.notifier
                            .notify(&HostNotification::ConnectivityError(message));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }
}
