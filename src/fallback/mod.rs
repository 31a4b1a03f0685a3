//! Sequential provider fallback
//!
//! `FallbackClient` walks a priority-ordered chain of model configurations and
//! returns the first successful completion. Attempts are strictly sequential:
//! an entry is only tried once the previous entry's response (or failure) has
//! been observed. Unconfigured entries are recorded and skipped without any
//! network traffic.
//!
//! There is no timeout or cancellation at this layer. A provider that hangs
//! stalls the chain for that call until the HTTP client gives up.

mod prompt;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::{AttemptOutcome, CompletionOutcome, Metrics};
use crate::providers::{
    self, GenerationParams, ModelConfig, OpenRouterHeaders, Provider, ProviderError,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

pub use prompt::with_schema_hint;

/// Prompt sent by `check_availability`
pub const PROBE_PROMPT: &str = "ping";

/// Token budget for availability probes
pub const PROBE_MAX_TOKENS: u32 = 8;

/// Successful completion attributed to the chain entry that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackResponse {
    /// Raw generated text; callers extract any embedded JSON themselves
    pub content: String,
    pub provider: Provider,
    pub model: String,
    pub success: bool,
}

/// One failed or skipped attempt
#[derive(Debug, Clone)]
pub struct AttemptError {
    pub config: ModelConfig,
    pub error: String,
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}: {}",
            self.config.provider(),
            self.config.model(),
            self.error
        )
    }
}

/// Every chain entry failed or was skipped
///
/// The message is one `"{provider}/{model}: {error}"` line per attempt, in
/// chain order.
#[derive(Debug, Clone)]
pub struct ExhaustedError {
    attempts: Vec<AttemptError>,
}

impl ExhaustedError {
    pub fn attempts(&self) -> &[AttemptError] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<AttemptError> {
        self.attempts
    }
}

impl fmt::Display for ExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attempt) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", attempt)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExhaustedError {}

/// Per-call overrides; unset fields fall back to the client's defaults
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Opaque JSON shape description appended to the prompt
    pub schema_hint: Option<serde_json::Value>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// Result of probing one chain entry
#[derive(Debug, Clone)]
pub struct Availability {
    pub config: ModelConfig,
    pub available: bool,
    pub error: Option<String>,
}

/// Priority-ordered fallback client
///
/// The chain is fixed at construction. The client holds no other mutable
/// state, so one instance can serve concurrent callers behind an `Arc`.
pub struct FallbackClient {
    chain: Vec<ModelConfig>,
    defaults: GenerationParams,
    openrouter: OpenRouterHeaders,
    http: reqwest::Client,
    metrics: Option<Arc<Metrics>>,
}

impl FallbackClient {
    /// Create a client over `chain` with default generation parameters
    pub fn new(chain: Vec<ModelConfig>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            chain,
            defaults: GenerationParams::default(),
            openrouter: OpenRouterHeaders::default(),
            http,
            metrics: None,
        })
    }

    /// Build the client from loaded configuration, reading credentials from
    /// the process environment
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::from_config_with(config, |name| std::env::var(name).ok())
    }

    /// Build the client from loaded configuration with an explicit credential lookup
    pub fn from_config_with<F>(config: &Config, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chain = config.resolve_chain(lookup);
        let client = Self::new(chain)?
            .with_defaults(config.defaults.params())
            .with_openrouter_headers(config.openrouter.headers());
        Ok(client)
    }

    pub fn with_defaults(mut self, defaults: GenerationParams) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_openrouter_headers(mut self, headers: OpenRouterHeaders) -> Self {
        self.openrouter = headers;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Full chain, configured and unconfigured, in priority order
    pub fn chain(&self) -> &[ModelConfig] {
        &self.chain
    }

    pub fn defaults(&self) -> GenerationParams {
        self.defaults
    }

    /// Entries with a credential, in priority order. No I/O.
    pub fn list_available(&self) -> Vec<&ModelConfig> {
        self.chain.iter().filter(|c| c.is_configured()).collect()
    }

    /// Try each chain entry in order and return the first success
    ///
    /// # Errors
    ///
    /// Returns `ExhaustedError` listing every attempt (including skips) when no
    /// entry produced a completion.
    pub async fn call_with_fallback(
        &self,
        prompt: &str,
        options: CallOptions,
    ) -> Result<FallbackResponse, ExhaustedError> {
        let params = GenerationParams {
            max_tokens: options.max_tokens.unwrap_or(self.defaults.max_tokens),
            temperature: options.temperature.unwrap_or(self.defaults.temperature),
        };
        let prompt = match &options.schema_hint {
            Some(hint) => with_schema_hint(prompt, hint),
            None => prompt.to_string(),
        };

        let mut attempts = Vec::new();

        for (index, config) in self.chain.iter().enumerate() {
            let (result, duration_ms) = self.attempt(config, &prompt, params).await;
            let outcome = match &result {
                Ok(_) => AttemptOutcome::Success,
                Err(e) => AttemptOutcome::from(e),
            };
            self.record_attempt(config.provider(), outcome, duration_ms);

            match result {
                Ok(content) => {
                    tracing::info!(
                        provider = %config.provider(),
                        model = %config.model(),
                        attempt = index + 1,
                        failed_before = attempts.len(),
                        "LLM call succeeded"
                    );
                    self.record_completion(CompletionOutcome::Success);
                    return Ok(FallbackResponse {
                        content,
                        provider: config.provider(),
                        model: config.model().to_string(),
                        success: true,
                    });
                }
                Err(error) => {
                    attempts.push(AttemptError {
                        config: config.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        let exhausted = ExhaustedError { attempts };
        tracing::error!(
            attempts = exhausted.attempts.len(),
            configured = self.list_available().len(),
            "All LLM providers failed:\n{}",
            exhausted
        );
        self.record_completion(CompletionOutcome::Exhausted);
        Err(exhausted)
    }

    /// Probe every configured entry with a minimal prompt
    ///
    /// Unlike `call_with_fallback` this does not stop at the first success.
    /// Unconfigured entries are reported unavailable without a request.
    /// Probes are diagnostics only and are not counted in attempt metrics.
    pub async fn check_availability(&self) -> Vec<Availability> {
        let params = GenerationParams {
            max_tokens: PROBE_MAX_TOKENS,
            temperature: self.defaults.temperature,
        };

        let mut report = Vec::with_capacity(self.chain.len());
        for config in &self.chain {
            let (result, _) = self.attempt(config, PROBE_PROMPT, params).await;
            report.push(Availability {
                config: config.clone(),
                available: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        tracing::info!(
            total = report.len(),
            available = report.iter().filter(|a| a.available).count(),
            "Availability check complete"
        );
        report
    }

    /// Run one entry: skip if unconfigured, otherwise exactly one adapter call
    ///
    /// Returns the outcome with the round-trip time in milliseconds (0 for skips).
    async fn attempt(
        &self,
        config: &ModelConfig,
        prompt: &str,
        params: GenerationParams,
    ) -> (Result<String, ProviderError>, f64) {
        if !config.is_configured() {
            tracing::debug!(
                provider = %config.provider(),
                model = %config.model(),
                "Skipping provider without credential"
            );
            return (Err(ProviderError::CredentialMissing), 0.0);
        }

        let started = Instant::now();
        let result = providers::invoke(&self.http, config, prompt, params, &self.openrouter).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Err(e) = &result {
            if let ProviderError::Http { body, .. } = e {
                tracing::debug!(
                    provider = %config.provider(),
                    model = %config.model(),
                    body = %body,
                    "Provider error body"
                );
            }
            tracing::warn!(
                provider = %config.provider(),
                model = %config.model(),
                error = %e,
                duration_ms = duration_ms,
                "LLM call failed"
            );
        }

        (result, duration_ms)
    }

    fn record_attempt(&self, provider: Provider, outcome: AttemptOutcome, duration_ms: f64) {
        if let Some(metrics) = &self.metrics {
            metrics.record_attempt(provider, outcome, duration_ms);
        }
    }

    fn record_completion(&self, outcome: CompletionOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_completion(outcome);
        }
    }
}
