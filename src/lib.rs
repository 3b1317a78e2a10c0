// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! RideLink client core: real-time session coordination for a
//! peer-matching ridesharing app.
//!
//! This crate implements the pair of long-lived socket protocols
//! (matching and trip) and the local state machine that reconciles their
//! message streams into a consistent view of what is happening right now
//! (idle, matching, or in a trip), surviving reconnects, cancellation,
//! and concurrent UI-driven actions.

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod models;
pub mod session;
pub mod transport;
pub mod wire;

pub use config::Config;
pub use coordinator::SessionCoordinator;
pub use error::{ChannelError, CodecError, TransportError};
pub use host::{BackgroundHost, HostNotification, Notifier, TracingNotifier};
pub use session::{HttpUserStateClient, MemorySessionStore, SessionStore, UserStateSource};
pub use transport::ws::WsTransport;
pub use transport::Transport;
