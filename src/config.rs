// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Client configuration loaded from environment variables.

use crate::models::Profile;
use std::env;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (optionally `host:port`), e.g. `rides.example.org`
    pub server_host: String,
    /// Use TLS (`wss://`/`https://`). On by default; disable for local
    /// development against a plain-text server.
    pub use_tls: bool,
    /// Seed bearer token for the session store
    pub token: Option<String>,
    /// Seed cached profile (JSON), e.g. persisted from a prior login
    pub cached_profile: Option<Profile>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            server_host: "localhost:8080".to_string(),
            use_tls: false,
            token: Some("test-token".to_string()),
            cached_profile: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if
    /// present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let use_tls = match env::var("RIDELINK_USE_TLS") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("RIDELINK_USE_TLS"))?,
            Err(_) => true,
        };

        let cached_profile = match env::var("RIDELINK_CACHED_PROFILE") {
            Ok(json) => Some(
                serde_json::from_str(&json)
                    .map_err(|_| ConfigError::Invalid("RIDELINK_CACHED_PROFILE"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            server_host: env::var("RIDELINK_SERVER")
                .map_err(|_| ConfigError::Missing("RIDELINK_SERVER"))?,
            use_tls,
            token: env::var("RIDELINK_TOKEN").ok(),
            cached_profile,
        })
    }

    /// Base URL for the WebSocket endpoints.
    pub fn ws_base(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}", scheme, self.server_host)
    }

    /// Base URL for the HTTP API.
    pub fn http_base(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.server_host)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
