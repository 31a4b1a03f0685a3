//! Command-line interface for garagebill
//!
//! Provides argument parsing and subcommand handling for the garagebill binary.

use crate::config::valid_temperature;
use clap::{Parser, Subcommand};

/// Vehicle-service note extraction backed by an LLM fallback chain
#[derive(Parser)]
#[command(name = "garagebill")]
#[command(version)]
#[command(about = "Vehicle-service note extraction backed by an LLM fallback chain")]
#[command(
    long_about = "garagebill sends free-form service notes to a priority-ordered chain of \
    LLM providers (Gemini, OpenAI, OpenRouter, Grok), falling back to the next provider \
    whenever one fails, and serves the result over HTTP."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Send one prompt through the fallback chain and print the result
    Complete {
        /// Prompt text
        prompt: String,

        /// Override the configured max_tokens (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_tokens: Option<u32>,

        /// Override the configured temperature (0.0 to 2.0)
        #[arg(long, value_parser = parse_temperature)]
        temperature: Option<f64>,

        /// Print only the first JSON object found in the output
        #[arg(long)]
        json: bool,
    },

    /// Probe every configured provider and print which ones respond
    Check,

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Same bounds as `[defaults] temperature` and the HTTP request field
fn parse_temperature(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if valid_temperature(value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0.0 and 2.0 (got {})", value))
    }
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# garagebill configuration
#
# Credentials are never stored here. Each [[chain]] entry names the environment
# variable that holds its API key; if the variable is unset the entry is skipped.

[server]
host = "0.0.0.0"
port = 3000

# Generation defaults, overridable per request
[defaults]
max_tokens = 1024
temperature = 0.7

# Attribution headers sent to OpenRouter
[openrouter]
referer = "https://localhost"
title = "garagebill"

# Fallback chain. Entries are tried top to bottom until one succeeds, so put
# free or cheap models first and the most reliable (expensive) ones last.
#
#   provider        gemini | openai | openrouter | grok
#   model           provider-specific model identifier
#   credential_env  environment variable holding the API key
#   base_url        optional endpoint override

[[chain]]
provider = "gemini"
model = "gemini-2.0-flash"
credential_env = "GEMINI_API_KEY"

[[chain]]
provider = "openrouter"
model = "deepseek/deepseek-chat"
credential_env = "OPENROUTER_API_KEY"

[[chain]]
provider = "grok"
model = "grok-2-latest"
credential_env = "XAI_API_KEY"

[[chain]]
provider = "openai"
model = "gpt-4o-mini"
credential_env = "OPENAI_API_KEY"

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}
