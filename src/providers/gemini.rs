//! Google Gemini `generateContent` adapter

use super::{GenerationParams, ModelConfig, Provider, ProviderError, read_success_body};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the Gemini API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

impl<'a> GenerateContentRequest<'a> {
    /// Single-turn request body: one content entry holding one text part
    pub fn new(prompt: &'a str, params: GenerationParams) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Full endpoint URL for `model`
pub fn endpoint_url(base_url: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", base_url, model)
}

/// Call `generateContent` once and return the first candidate's text
pub async fn generate(
    http: &reqwest::Client,
    target: &ModelConfig,
    prompt: &str,
    params: GenerationParams,
) -> Result<String, ProviderError> {
    let url = endpoint_url(target.base_url(), target.model());

    tracing::debug!(
        provider = %Provider::Gemini,
        model = %target.model(),
        url = %url,
        max_tokens = params.max_tokens,
        "Sending generateContent request"
    );

    let response = http
        .post(&url)
        .header(API_KEY_HEADER, target.credential())
        .json(&GenerateContentRequest::new(prompt, params))
        .send()
        .await
        .map_err(|e| ProviderError::transport(Provider::Gemini, e))?;

    let body = read_success_body(Provider::Gemini, response).await?;

    let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid(Provider::Gemini, format!("body is not valid JSON: {}", e))
    })?;

    parsed.into_text().ok_or_else(|| {
        ProviderError::invalid(Provider::Gemini, "missing candidates[0].content.parts[0].text")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let params = GenerationParams {
            max_tokens: 256,
            temperature: 0.2,
        };
        let body = serde_json::to_value(GenerateContentRequest::new("fix brakes", params)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"parts": [{"text": "fix brakes"}]}],
                "generationConfig": {"temperature": 0.2, "maxOutputTokens": 256}
            })
        );
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url(DEFAULT_BASE_URL, "gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_extracts_first_candidate_text() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"parts": [{"text": "other"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("first"));
    }

    #[test]
    fn test_missing_candidates_yields_none() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_candidate_without_content_yields_none() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert!(parsed.into_text().is_none());
    }
}
