//! Gateway configuration.
//!
//! Configuration comes from the environment: `OLLAMA_URL` and `OLLAMA_MODEL`
//! are required, timeouts have defaults and can be overridden with
//! `INTERVO_*_TIMEOUT_SECS` variables.

use intervo_core::error::{IntervoError, Result};
use std::env;
use std::time::Duration;

/// Opening-question generation rides out model cold starts, so its budget is
/// much larger than the per-turn budgets.
const DEFAULT_OPENING_TIMEOUT_SECS: u64 = 120;
const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 35;
const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 60;

/// Connection and timeout settings for the language model gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the Ollama-compatible service, e.g. `http://ollama:11434`.
    pub base_url: String,
    /// Model name, e.g. `llama3.1:8b-instruct-q5_K_M`.
    pub model: String,
    /// Budget for opening-question generation (cold starts expected).
    pub opening_timeout: Duration,
    /// Budget for follow-up question generation.
    pub reply_timeout: Duration,
    /// Budget for feedback generation.
    pub feedback_timeout: Duration,
}

impl GatewayConfig {
    /// Creates a config with default timeouts.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            opening_timeout: Duration::from_secs(DEFAULT_OPENING_TIMEOUT_SECS),
            reply_timeout: Duration::from_secs(DEFAULT_REPLY_TIMEOUT_SECS),
            feedback_timeout: Duration::from_secs(DEFAULT_FEEDBACK_TIMEOUT_SECS),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `OLLAMA_URL` and `OLLAMA_MODEL` are required. Timeouts default as
    /// above and can be overridden with `INTERVO_OPENING_TIMEOUT_SECS`,
    /// `INTERVO_REPLY_TIMEOUT_SECS`, and `INTERVO_FEEDBACK_TIMEOUT_SECS`.
    pub fn try_from_env() -> Result<Self> {
        let base_url = env::var("OLLAMA_URL").map_err(|_| {
            IntervoError::internal("OLLAMA_URL is not defined in environment variables")
        })?;
        let model = env::var("OLLAMA_MODEL").map_err(|_| {
            IntervoError::internal("OLLAMA_MODEL is not defined in environment variables")
        })?;

        let mut config = Self::new(base_url, model);
        if let Some(secs) = env_secs("INTERVO_OPENING_TIMEOUT_SECS") {
            config.opening_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("INTERVO_REPLY_TIMEOUT_SECS") {
            config.reply_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("INTERVO_FEEDBACK_TIMEOUT_SECS") {
            config.feedback_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn env_secs(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_give_opening_the_longest_budget() {
        let config = GatewayConfig::new("http://localhost:11434", "llama3.1");
        assert!(config.opening_timeout > config.reply_timeout);
        assert!(config.opening_timeout > config.feedback_timeout);
    }
}
