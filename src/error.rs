//! Error types for garagebill
//!
//! All errors implement `IntoResponse` for Axum handlers. Per-attempt provider
//! failures live in `providers::ProviderError` and never reach this type on
//! their own; only an exhausted chain does.

use crate::fallback::ExhaustedError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("All LLM providers failed:\n{0}")]
    AllProvidersExhausted(#[from] ExhaustedError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            Self::AllProvidersExhausted(exhausted) => {
                let attempts: Vec<serde_json::Value> = exhausted
                    .attempts()
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "provider": a.config.provider(),
                            "model": a.config.model(),
                            "error": a.error,
                        })
                    })
                    .collect();
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "error": "All LLM providers failed",
                        "attempts": attempts,
                    }),
                )
            }
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
