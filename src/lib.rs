//! garagebill - vehicle-service note extraction backed by an LLM fallback chain
//!
//! The core is [`fallback::FallbackClient`]: a priority-ordered, strictly
//! sequential failover over Gemini, OpenAI, OpenRouter and Grok. The rest of
//! the crate wires it into configuration, an HTTP API, a CLI, logging and
//! metrics.

pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod providers;
pub mod shared;
pub mod telemetry;
