//! Provider listing and availability endpoints
//!
//! GET /v1/providers lists configured chain entries without I/O.
//! GET /v1/providers/check probes every configured entry.

use crate::fallback::Availability;
use crate::handlers::AppState;
use crate::providers::{ModelConfig, Provider};
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProviderEntry {
    pub provider: Provider,
    pub model: String,
}

impl From<&ModelConfig> for ProviderEntry {
    fn from(config: &ModelConfig) -> Self {
        Self {
            provider: config.provider(),
            model: config.model().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderEntry>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityEntry {
    pub provider: Provider,
    pub model: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Availability> for AvailabilityEntry {
    fn from(a: Availability) -> Self {
        Self {
            provider: a.config.provider(),
            model: a.config.model().to_string(),
            available: a.available,
            error: a.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub providers: Vec<AvailabilityEntry>,
}

/// GET /v1/providers
pub async fn list_handler(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = state
        .client()
        .list_available()
        .into_iter()
        .map(ProviderEntry::from)
        .collect();

    Json(ProvidersResponse { providers })
}

/// GET /v1/providers/check
pub async fn check_handler(State(state): State<AppState>) -> Json<AvailabilityResponse> {
    let providers = state
        .client()
        .check_availability()
        .await
        .into_iter()
        .map(AvailabilityEntry::from)
        .collect();

    Json(AvailabilityResponse { providers })
}
