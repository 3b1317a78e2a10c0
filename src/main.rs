// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! RideLink headless client daemon.
//!
//! Runs the session coordinator and background host without a UI:
//! resumes any active trip on startup, then keeps the real-time session
//! alive until interrupted. Useful against a live server for protocol
//! testing.

use ridelink::{
    BackgroundHost, Config, HttpUserStateClient, MemorySessionStore, SessionCoordinator,
    TracingNotifier, WsTransport,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(server = %config.server_host, tls = config.use_tls, "starting RideLink client");

    let session = Arc::new(MemorySessionStore::new(
        config.token.clone(),
        config.cached_profile.clone(),
    ));
    let transport = Arc::new(WsTransport::new(config.ws_base()));
    let user_state = Arc::new(HttpUserStateClient::new(
        config.http_base(),
        session.clone(),
    ));

    let coordinator = SessionCoordinator::new(transport, session, user_state);
    let host = BackgroundHost::new(coordinator.clone(), Arc::new(TracingNotifier));
    let host_task = host.spawn();
    tracing::info!("background host running");

    coordinator.check_initial_state().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    coordinator.stop_matching().await;
    coordinator.disconnect_from_trip().await;
    host_task.abort();

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ridelink=debug,info")),
        )
        .init();
}
