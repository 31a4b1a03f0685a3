//! Health check endpoint
//!
//! Liveness only: it never calls a provider. Use `/v1/providers/check` for a
//! live probe.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Chain entries that have a credential
    pub configured_providers: usize,
    /// Chain entries in total
    pub chain_length: usize,
}

pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            configured_providers: state.client().list_available().len(),
            chain_length: state.client().chain().len(),
        }),
    )
}
