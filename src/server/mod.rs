//! HTTP server for the fork sync bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 202 Accepted)
//! - `GET /health` - Returns 200 if server is running
//!
//! The state is generic over the GitHub API client so the router can be
//! exercised in tests with a mock.

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::github::GitHubApi;
use crate::sync::SyncLimits;

/// Shared application state, passed to handlers via Axum's `State` extractor.
pub struct AppState<C> {
    inner: Arc<AppStateInner<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<C> {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    /// The app-level GitHub client.
    client: C,

    /// Fan-out limits applied to each event.
    limits: SyncLimits,
}

impl<C> AppState<C> {
    /// Creates a new `AppState`.
    pub fn new(webhook_secret: impl Into<Vec<u8>>, client: C, limits: SyncLimits) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                client,
                limits,
            }),
        }
    }

    /// Returns the webhook secret.
    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    /// Returns the app-level GitHub client.
    pub fn client(&self) -> &C {
        &self.inner.client
    }

    /// Returns the fan-out limits.
    pub fn limits(&self) -> SyncLimits {
        self.inner.limits
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C>(app_state: AppState<C>) -> axum::Router
where
    C: GitHubApi + Clone + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<C>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
