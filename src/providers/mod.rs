//! LLM provider adapters
//!
//! Each adapter translates a generic (prompt, max_tokens, temperature) call into
//! one provider's HTTP request shape and pulls the generated text back out of
//! that provider's response. Adapters issue exactly one POST and never retry;
//! moving on to the next configuration is the orchestrator's job.

pub mod gemini;
pub mod openai_compat;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default completion budget when the caller does not override it
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature when the caller does not override it
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Maximum number of response-body bytes kept on an HTTP error for logging
const ERROR_BODY_PREVIEW: usize = 512;

/// Supported LLM vendors
///
/// Closed set: adding a vendor means adding a variant, and the compiler then
/// points at every dispatch `match` that needs wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAi,
    OpenRouter,
    Grok,
}

impl Provider {
    /// Lowercase tag used in config files, logs, metrics labels and attempt reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Grok => "grok",
        }
    }

    /// Human-facing vendor name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAi => "OpenAI",
            Provider::OpenRouter => "OpenRouter",
            Provider::Grok => "Grok",
        }
    }

    /// Public API base URL for this vendor
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => gemini::DEFAULT_BASE_URL,
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Grok => "https://api.x.ai/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the priority-ordered fallback chain
///
/// Immutable after construction. An empty credential marks the entry as
/// unconfigured: the orchestrator records a skip for it and never touches the
/// network.
#[derive(Clone, PartialEq)]
pub struct ModelConfig {
    provider: Provider,
    model: String,
    credential: String,
    base_url: Option<String>,
}

impl ModelConfig {
    /// Create a chain entry pointing at the provider's public endpoint
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            credential: credential.into(),
            base_url: None,
        }
    }

    /// Point this entry at a different base URL (self-hosted gateways, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Effective base URL: the override if one was set, else the vendor default
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// True when a credential is present and the entry may be invoked
    pub fn is_configured(&self) -> bool {
        !self.credential.is_empty()
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field(
                "credential",
                &if self.is_configured() { "<redacted>" } else { "<unset>" },
            )
            .field("base_url", &self.base_url())
            .finish()
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Sampling parameters passed to every adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Extra headers OpenRouter uses for app attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterHeaders {
    pub referer: String,
    pub title: String,
}

impl Default for OpenRouterHeaders {
    fn default() -> Self {
        Self {
            referer: "https://localhost".to_string(),
            title: "garagebill".to_string(),
        }
    }
}

/// Failure of a single attempt against one chain entry
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The entry has no credential; recorded as a skip, never raised to callers
    #[error("credential not configured")]
    CredentialMissing,

    /// Non-2xx status from the provider
    #[error("{provider} API error: {status} {reason}")]
    Http {
        provider: &'static str,
        status: u16,
        reason: String,
        body: String,
    },

    /// 2xx status but the body lacks the expected candidate/choice text
    #[error("Invalid response from {provider}: {detail}")]
    InvalidResponse {
        provider: &'static str,
        detail: String,
    },

    /// The request never produced an HTTP response (DNS, connect, reset)
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    pub(crate) fn transport(provider: Provider, source: reqwest::Error) -> Self {
        ProviderError::Transport {
            provider: provider.label(),
            source,
        }
    }

    pub(crate) fn invalid(provider: Provider, detail: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider: provider.label(),
            detail: detail.into(),
        }
    }
}

/// Shared response handling for every adapter
///
/// Maps non-2xx statuses to `ProviderError::Http` and returns the raw body text
/// for successful responses. The body is parsed by the caller because each
/// vendor nests the generated text differently.
pub(crate) async fn read_success_body(
    provider: Provider,
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > ERROR_BODY_PREVIEW {
            let mut cut = ERROR_BODY_PREVIEW;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(ProviderError::Http {
            provider: provider.label(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        });
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::transport(provider, e))
}

/// Invoke the adapter for `target.provider()`
///
/// The caller guarantees `target` is configured; this function issues exactly
/// one HTTP request.
pub(crate) async fn invoke(
    http: &reqwest::Client,
    target: &ModelConfig,
    prompt: &str,
    params: GenerationParams,
    openrouter: &OpenRouterHeaders,
) -> Result<String, ProviderError> {
    match target.provider() {
        Provider::Gemini => gemini::generate(http, target, prompt, params).await,
        Provider::OpenAi | Provider::Grok => {
            openai_compat::chat(http, target, prompt, params, &[]).await
        }
        Provider::OpenRouter => {
            let headers = [
                ("HTTP-Referer", openrouter.referer.as_str()),
                ("X-Title", openrouter.title.as_str()),
            ];
            openai_compat::chat(http, target, prompt, params, &headers).await
        }
    }
}
