//! Prometheus metrics endpoint

use axum::{extract::State, http::StatusCode};

use crate::handlers::AppState;

/// Returns metrics in Prometheus text format, or 500 if encoding fails
///
/// ```bash
/// curl http://localhost:3000/metrics
/// # TYPE garagebill_attempts_total counter
/// garagebill_attempts_total{outcome="success",provider="gemini"} 42
/// ```
pub async fn handler(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics().gather() {
        Ok(output) => (StatusCode::OK, output),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gather metrics for Prometheus scraping");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fallback::CallOptions;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_metrics_handler_reports_skipped_attempts() {
        let config = Config::from_str(
            r#"
[server]
host = "127.0.0.1"
port = 3000

[[chain]]
provider = "openrouter"
model = "deepseek/deepseek-chat"
credential_env = "OPENROUTER_API_KEY"
"#,
        )
        .unwrap();
        let state = AppState::with_credentials(&config, |_| None).unwrap();

        let _ = state
            .client()
            .call_with_fallback("notes", CallOptions::default())
            .await;

        let (status, body) = handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("garagebill_attempts_total"));
        assert!(body.contains(r#"outcome="skipped""#));
        assert!(body.contains(r#"garagebill_completions_total{outcome="exhausted"} 1"#));
    }
}
