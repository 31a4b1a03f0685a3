//! HTTP request handlers for the garagebill API

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::fallback::FallbackClient;
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod complete;
pub mod health;
pub mod metrics;
pub mod providers;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    client: Arc<FallbackClient>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Build state from configuration, reading credentials from the environment
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_credentials(config, |name| std::env::var(name).ok())
    }

    /// Build state from configuration with an explicit credential lookup
    pub fn with_credentials<F>(config: &Config, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let metrics = Arc::new(
            Metrics::new()
                .map_err(|e| AppError::Internal(format!("Failed to create metrics: {}", e)))?,
        );
        let client =
            FallbackClient::from_config_with(config, lookup)?.with_metrics(metrics.clone());

        Ok(Self {
            client: Arc::new(client),
            metrics,
        })
    }

    pub fn client(&self) -> &FallbackClient {
        &self.client
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Full application router with middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/v1/complete", post(complete::handler))
        .route("/v1/providers", get(providers::list_handler))
        .route("/v1/providers/check", get(providers::check_handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
