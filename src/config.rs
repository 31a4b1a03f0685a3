//! Configuration management for garagebill
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Credentials never live in the file: each chain entry names an environment
//! variable, resolved once at startup. A missing variable leaves that entry
//! unconfigured instead of failing startup.

use crate::providers::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationParams, ModelConfig, OpenRouterHeaders,
    Provider,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    /// Fallback chain; file order is preference order
    pub chain: Vec<ChainEntry>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Generation defaults applied when a call does not override them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl DefaultsConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// OpenRouter attribution headers (`HTTP-Referer`, `X-Title`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl OpenRouterConfig {
    pub fn headers(&self) -> OpenRouterHeaders {
        OpenRouterHeaders {
            referer: self.referer.clone(),
            title: self.title.clone(),
        }
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            referer: default_referer(),
            title: default_title(),
        }
    }
}

fn default_referer() -> String {
    OpenRouterHeaders::default().referer
}

fn default_title() -> String {
    OpenRouterHeaders::default().title
}

/// One `[[chain]]` entry as written in the config file
///
/// Fields are private; entries are only created through deserialization and
/// checked by `Config::validate()`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainEntry {
    provider: Provider,
    model: String,
    /// Name of the environment variable holding the credential
    credential_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
}

impl ChainEntry {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credential_env(&self) -> &str {
        &self.credential_env
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Build the runtime chain, looking each credential up through `lookup`
    ///
    /// Blank values count as missing. Order matches the file.
    pub fn resolve_chain<F>(&self, lookup: F) -> Vec<ModelConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.chain
            .iter()
            .map(|entry| {
                let credential = lookup(&entry.credential_env)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();

                if credential.is_empty() {
                    tracing::debug!(
                        provider = %entry.provider,
                        model = %entry.model,
                        env = %entry.credential_env,
                        "Credential variable not set, entry will be skipped"
                    );
                }

                let config = ModelConfig::new(entry.provider, entry.model.clone(), credential);
                match &entry.base_url {
                    Some(url) => config.with_base_url(url.clone()),
                    None => config,
                }
            })
            .collect()
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when
    /// building a `Config` some other way.
    pub fn validate(&self) -> crate::error::AppResult<()> {
        if self.chain.is_empty() {
            return Err(crate::error::AppError::Config(
                "Configuration error: no [[chain]] entries. At least one provider \
                entry is required.\n\n\
                Example fix - add to config.toml:\n\
                [[chain]]\n\
                provider = \"gemini\"\n\
                model = \"gemini-2.0-flash\"\n\
                credential_env = \"GEMINI_API_KEY\""
                    .to_string(),
            ));
        }

        for (index, entry) in self.chain.iter().enumerate() {
            let position = index + 1;

            if entry.model.trim().is_empty() {
                return Err(crate::error::AppError::Config(format!(
                    "Configuration error: chain entry #{} ({}) has an empty model.",
                    position, entry.provider
                )));
            }

            if entry.credential_env.trim().is_empty() {
                return Err(crate::error::AppError::Config(format!(
                    "Configuration error: chain entry #{} ({}/{}) has an empty credential_env. \
                    Name the environment variable that holds the API key.",
                    position, entry.provider, entry.model
                )));
            }

            if let Some(url) = &entry.base_url
                && !url.starts_with("http://")
                && !url.starts_with("https://")
            {
                return Err(crate::error::AppError::Config(format!(
                    "Configuration error: chain entry #{} ({}/{}) has invalid base_url '{}'. \
                    base_url must start with 'http://' or 'https://'.",
                    position, entry.provider, entry.model, url
                )));
            }
        }

        if self.defaults.max_tokens == 0 {
            return Err(crate::error::AppError::Config(
                "Configuration error: defaults.max_tokens must be greater than 0".to_string(),
            ));
        }

        if !valid_temperature(self.defaults.temperature) {
            return Err(crate::error::AppError::Config(format!(
                "Configuration error: defaults.temperature {} is invalid. \
                temperature must be a finite number between 0.0 and 2.0.",
                self.defaults.temperature
            )));
        }

        Ok(())
    }
}

/// Standard sampling range accepted by every supported provider
pub fn valid_temperature(temperature: f64) -> bool {
    temperature.is_finite() && (0.0..=2.0).contains(&temperature)
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}
