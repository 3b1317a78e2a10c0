// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Session/credential store and the user-state query collaborator.
//!
//! Both are injected into the coordinator at construction. The store is
//! read at connect time by both channels; invalidation is fire-and-forget
//! (an in-flight connect may still use a now-stale token; the server is
//! authoritative on auth validity).

use crate::models::{Profile, UserState};
use anyhow::Context;
use futures_util::future::BoxFuture;
use std::sync::RwLock;

/// Bearer token and cached profile used to authenticate both sockets.
pub trait SessionStore: Send + Sync {
    fn current_token(&self) -> Option<String>;

    fn cached_profile(&self) -> Option<Profile>;

    /// Drop the credential so the surrounding application forces
    /// re-authentication.
    fn invalidate(&self);
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<SessionData>,
}

#[derive(Default)]
struct SessionData {
    token: Option<String>,
    profile: Option<Profile>,
}

impl MemorySessionStore {
    pub fn new(token: Option<String>, profile: Option<Profile>) -> Self {
        Self {
            inner: RwLock::new(SessionData { token, profile }),
        }
    }

    /// Store a fresh credential, e.g. after login.
    pub fn set_session(&self, token: String, profile: Option<Profile>) {
        let mut data = self.inner.write().unwrap_or_else(|e| e.into_inner());
        data.token = Some(token);
        data.profile = profile;
    }
}

impl SessionStore for MemorySessionStore {
    fn current_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .token
            .clone()
    }

    fn cached_profile(&self) -> Option<Profile> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .profile
            .clone()
    }

    fn invalidate(&self) {
        tracing::info!("session invalidated");
        let mut data = self.inner.write().unwrap_or_else(|e| e.into_inner());
        data.token = None;
        data.profile = None;
    }
}

/// External source for "does this user already have an active trip".
pub trait UserStateSource: Send + Sync {
    fn current_state(&self) -> BoxFuture<'_, anyhow::Result<UserState>>;
}

/// Production user-state client: `GET /users/state` with bearer auth.
pub struct HttpUserStateClient {
    http: reqwest::Client,
    base_url: String,
    session: std::sync::Arc<dyn SessionStore>,
}

impl HttpUserStateClient {
    pub fn new(base_url: impl Into<String>, session: std::sync::Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }
}

impl UserStateSource for HttpUserStateClient {
    fn current_state(&self) -> BoxFuture<'_, anyhow::Result<UserState>> {
        Box::pin(async move {
            let token = self
                .session
                .current_token()
                .context("no stored credential")?;

            let response = self
                .http
                .get(format!("{}/users/state", self.base_url))
                .bearer_auth(token)
                .send()
                .await
                .context("user-state request failed")?;

            if !response.status().is_success() {
                anyhow::bail!("user-state query returned {}", response.status());
            }

            response
                .json::<UserState>()
                .await
                .context("invalid user-state response body")
        })
    }
}
