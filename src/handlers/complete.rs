//! Completion endpoint
//!
//! Handles POST /v1/complete: one fallback pass over the configured chain.

use crate::config::valid_temperature;
use crate::error::AppError;
use crate::fallback::{CallOptions, FallbackResponse};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::shared::first_json_object;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum allowed prompt length in characters
const MAX_PROMPT_LENGTH: usize = 100_000;

/// Completion request from a client (web form, Telegram bridge)
///
/// Validation is enforced during deserialization - invalid instances cannot exist.
#[derive(Debug, Clone)]
pub struct CompleteRequest {
    prompt: String,
    schema_hint: Option<serde_json::Value>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    extract_json: bool,
}

impl CompleteRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn extract_json(&self) -> bool {
        self.extract_json
    }

    pub fn options(&self) -> CallOptions {
        CallOptions {
            schema_hint: self.schema_hint.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl<'de> Deserialize<'de> for CompleteRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawCompleteRequest {
            prompt: String,
            #[serde(default)]
            schema_hint: Option<serde_json::Value>,
            #[serde(default)]
            max_tokens: Option<u32>,
            #[serde(default)]
            temperature: Option<f64>,
            #[serde(default)]
            extract_json: bool,
        }

        let raw = RawCompleteRequest::deserialize(deserializer)?;

        if raw.prompt.trim().is_empty() {
            return Err(serde::de::Error::custom(
                "prompt cannot be empty or contain only whitespace",
            ));
        }

        let char_count = raw.prompt.chars().count();
        if char_count > MAX_PROMPT_LENGTH {
            return Err(serde::de::Error::custom(format!(
                "prompt exceeds maximum length of {} characters (got {})",
                MAX_PROMPT_LENGTH, char_count
            )));
        }

        if raw.max_tokens == Some(0) {
            return Err(serde::de::Error::custom("max_tokens must be greater than 0"));
        }

        if let Some(t) = raw.temperature
            && !valid_temperature(t)
        {
            return Err(serde::de::Error::custom(format!(
                "temperature must be between 0.0 and 2.0 (got {})",
                t
            )));
        }

        Ok(CompleteRequest {
            prompt: raw.prompt,
            schema_hint: raw.schema_hint.filter(|h| !h.is_null()),
            max_tokens: raw.max_tokens,
            temperature: raw.temperature,
            extract_json: raw.extract_json,
        })
    }
}

/// Completion response: the fallback result plus optional extracted JSON
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    #[serde(flatten)]
    pub response: FallbackResponse,
    /// First JSON object found in `content`; present only when requested and found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

/// POST /v1/complete
///
/// Latency is the sum of every attempted provider's round trip; skipped
/// entries cost nothing.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> Result<Json<CompleteResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(
            request_id = %request_id,
            status = %rejection.status(),
            "Rejected completion request"
        );
        AppError::Validation(rejection.body_text())
    })?;

    tracing::debug!(
        request_id = %request_id,
        prompt_length = request.prompt().len(),
        extract_json = request.extract_json(),
        "Received completion request"
    );

    let response = state
        .client()
        .call_with_fallback(request.prompt(), request.options())
        .await
        .inspect_err(|e| {
            tracing::error!(
                request_id = %request_id,
                attempts = e.attempts().len(),
                "Completion failed on every provider"
            );
        })?;

    let json = if request.extract_json() {
        let found = first_json_object(&response.content);
        if found.is_none() {
            tracing::warn!(
                request_id = %request_id,
                provider = %response.provider,
                model = %response.model,
                "No JSON object found in model output"
            );
        }
        found
    } else {
        None
    };

    tracing::info!(
        request_id = %request_id,
        provider = %response.provider,
        model = %response.model,
        content_length = response.content.len(),
        "Completion served"
    );

    Ok(Json(CompleteResponse { response, json }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_minimal_defaults() {
        let req: CompleteRequest = serde_json::from_str(r#"{"prompt": "Oil change"}"#).unwrap();
        assert_eq!(req.prompt(), "Oil change");
        assert!(!req.extract_json());
        let opts = req.options();
        assert!(opts.schema_hint.is_none());
        assert!(opts.max_tokens.is_none());
        assert!(opts.temperature.is_none());
    }

    #[test]
    fn test_request_with_overrides() {
        let req: CompleteRequest = serde_json::from_str(
            r#"{"prompt": "x", "max_tokens": 64, "temperature": 0.1,
                "schema_hint": {"total": "number"}, "extract_json": true}"#,
        )
        .unwrap();
        let opts = req.options();
        assert_eq!(opts.max_tokens, Some(64));
        assert_eq!(opts.temperature, Some(0.1));
        assert!(opts.schema_hint.is_some());
        assert!(req.extract_json());
    }

    #[test]
    fn test_null_schema_hint_is_dropped() {
        let req: CompleteRequest =
            serde_json::from_str(r#"{"prompt": "x", "schema_hint": null}"#).unwrap();
        assert!(req.options().schema_hint.is_none());
    }

    #[test]
    fn test_request_rejects_blank_prompt() {
        let err = serde_json::from_str::<CompleteRequest>(r#"{"prompt": "  \n "}"#).unwrap_err();
        assert!(err.to_string().contains("prompt cannot be empty"));
    }

    #[test]
    fn test_request_rejects_oversized_prompt() {
        let body = serde_json::json!({ "prompt": "a".repeat(MAX_PROMPT_LENGTH + 1) });
        let err = serde_json::from_value::<CompleteRequest>(body).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn test_request_rejects_bad_overrides() {
        let zero_tokens = r#"{"prompt": "x", "max_tokens": 0}"#;
        assert!(serde_json::from_str::<CompleteRequest>(zero_tokens).is_err());

        let hot = r#"{"prompt": "x", "temperature": 3.0}"#;
        assert!(serde_json::from_str::<CompleteRequest>(hot).is_err());
    }

    #[test]
    fn test_response_flattens_fallback_fields() {
        let response = CompleteResponse {
            response: FallbackResponse {
                content: "{\"a\":1}".to_string(),
                provider: crate::providers::Provider::OpenAi,
                model: "gpt-4o-mini".to_string(),
                success: true,
            },
            json: Some(serde_json::json!({"a": 1})),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["provider"], "openai");
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["success"], true);
        assert_eq!(value["json"]["a"], 1);
    }
}
