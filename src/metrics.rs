//! Prometheus metrics collection for garagebill
//!
//! Tracks:
//! - Provider attempts by provider and outcome
//! - Per-attempt latency by provider
//! - Completed fallback passes by outcome
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::providers::Provider;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Result of one attempt against one chain entry
///
/// Enum labels keep cardinality bounded: 4 providers × 5 outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    HttpError,
    InvalidResponse,
    TransportError,
    /// No credential; no request was sent
    Skipped,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::HttpError => "http_error",
            AttemptOutcome::InvalidResponse => "invalid_response",
            AttemptOutcome::TransportError => "transport_error",
            AttemptOutcome::Skipped => "skipped",
        }
    }
}

impl From<&crate::providers::ProviderError> for AttemptOutcome {
    fn from(err: &crate::providers::ProviderError) -> Self {
        use crate::providers::ProviderError;
        match err {
            ProviderError::CredentialMissing => AttemptOutcome::Skipped,
            ProviderError::Http { .. } => AttemptOutcome::HttpError,
            ProviderError::InvalidResponse { .. } => AttemptOutcome::InvalidResponse,
            ProviderError::Transport { .. } => AttemptOutcome::TransportError,
        }
    }
}

/// Result of a whole fallback pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success,
    Exhausted,
}

impl CompletionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionOutcome::Success => "success",
            CompletionOutcome::Exhausted => "exhausted",
        }
    }
}

/// Metrics collector
///
/// Cloning is cheap; all collectors share the same registry.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    attempts_total: IntCounterVec,
    attempt_duration: HistogramVec,
    completions_total: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let attempts_total = IntCounterVec::new(
            Opts::new(
                "garagebill_attempts_total",
                "Provider attempts made during fallback passes, by provider and outcome",
            ),
            &["provider", "outcome"],
        )?;

        // Provider round trips range from ~200ms to tens of seconds
        let attempt_duration = HistogramVec::new(
            HistogramOpts::new(
                "garagebill_attempt_duration_ms",
                "Latency of a single provider attempt in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0,
            ]),
            &["provider"],
        )?;

        let completions_total = IntCounterVec::new(
            Opts::new(
                "garagebill_completions_total",
                "Fallback passes by final outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(attempt_duration.clone()))?;
        registry.register(Box::new(completions_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            attempts_total,
            attempt_duration,
            completions_total,
        })
    }

    /// Record one attempt; `duration_ms` is ignored for skipped attempts
    pub fn record_attempt(&self, provider: Provider, outcome: AttemptOutcome, duration_ms: f64) {
        self.attempts_total
            .with_label_values(&[provider.as_str(), outcome.as_str()])
            .inc();

        if outcome == AttemptOutcome::Skipped {
            return;
        }

        // NaN/negative durations would poison every histogram quantile
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            tracing::warn!(
                provider = %provider,
                duration_ms = duration_ms,
                "Dropping invalid attempt duration"
            );
            return;
        }

        self.attempt_duration
            .with_label_values(&[provider.as_str()])
            .observe(duration_ms);
    }

    pub fn record_completion(&self, outcome: CompletionOutcome) {
        self.completions_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Current attempt count for one label pair
    pub fn attempts_count(&self, provider: Provider, outcome: AttemptOutcome) -> u64 {
        self.attempts_total
            .with_label_values(&[provider.as_str(), outcome.as_str()])
            .get()
    }

    /// Current completion count for one outcome
    pub fn completions_count(&self, outcome: CompletionOutcome) -> u64 {
        self.completions_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    /// Gather all metrics and encode them in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    metric_family_count = metric_families.len(),
                    "Prometheus text encoder failed"
                );
                e
            })?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!(
                "Failed to convert metrics to UTF-8 at byte {}: {}",
                e.utf8_error().valid_up_to(),
                e
            ))
        })
    }
}
