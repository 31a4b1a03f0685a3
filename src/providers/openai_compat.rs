//! OpenAI-style `/chat/completions` adapter
//!
//! Shared by OpenAI, OpenRouter and Grok, which only differ in base URL and
//! (for OpenRouter) a couple of attribution headers.

use super::{GenerationParams, ModelConfig, ProviderError, read_success_body};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Single user message carrying the whole prompt
    pub fn new(model: &'a str, prompt: &'a str, params: GenerationParams) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`, if present
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

/// Full endpoint URL for a base such as `https://api.openai.com/v1`
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url)
}

/// Call `/chat/completions` once and return the first choice's content
pub async fn chat(
    http: &reqwest::Client,
    target: &ModelConfig,
    prompt: &str,
    params: GenerationParams,
    extra_headers: &[(&str, &str)],
) -> Result<String, ProviderError> {
    let provider = target.provider();
    let url = endpoint_url(target.base_url());

    tracing::debug!(
        provider = %provider,
        model = %target.model(),
        url = %url,
        max_tokens = params.max_tokens,
        "Sending chat completion request"
    );

    let mut request = http
        .post(&url)
        .bearer_auth(target.credential())
        .json(&ChatCompletionRequest::new(target.model(), prompt, params));
    for (name, value) in extra_headers {
        request = request.header(*name, *value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    let body = read_success_body(provider, response).await?;

    let parsed: ChatCompletionResponse = serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid(provider, format!("body is not valid JSON: {}", e)))?;

    parsed
        .into_text()
        .ok_or_else(|| ProviderError::invalid(provider, "missing choices[0].message.content"))
}
