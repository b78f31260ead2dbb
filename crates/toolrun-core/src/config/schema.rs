//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `RetryConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! Every struct is `#[serde(default)]` so partial files are valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard chat-completions endpoint base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.toolrun/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub retry: RetryConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// How strictly tool arguments are checked against the declared parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Unknown parameter names are rejected.
    #[default]
    Strict,
    /// Unknown parameter names are ignored.
    Permissive,
}

/// Agent identity, prompt templates, and session limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub description: String,
    /// Template for the opening user message. `{goal}` is the caller's goal.
    pub prompt_template: String,
    /// Instructions on how the final answer should be formatted.
    pub response_format: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Maximum tool dispatches per session.
    pub max_turns: usize,
    pub validation: ValidationMode,
    /// Per model call timeout, in seconds.
    pub call_timeout_secs: u64,
    /// Whole-session deadline, in seconds. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "toolrun".to_string(),
            role: "a precise assistant that uses tools to get facts right".to_string(),
            goal: String::new(),
            description: String::new(),
            prompt_template: "{goal}".to_string(),
            response_format: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            max_turns: 10,
            validation: ValidationMode::Strict,
            call_timeout_secs: 60,
            session_timeout_secs: None,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Model backend endpoint and credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Custom API base URL (defaults to [`DEFAULT_API_BASE`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
    /// Transport-level timeout for one HTTP attempt, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            extra_headers: None,
            request_timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// The configured base URL, or the standard endpoint.
    pub fn api_base_or_default(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }
}

// ─────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────

/// Backoff settings for retryable model-call failures.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Full jitter: sleep a uniform random fraction of the backoff ceiling.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_turns, 10);
        assert_eq!(config.agent.validation, ValidationMode::Strict);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.retry.max_delay_ms, 8_000);
        assert!(!config.provider.is_configured());
        assert_eq!(config.provider.api_base_or_default(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"agent": {"maxTurns": 4, "validation": "permissive"}}"#,
        )
        .unwrap();
        assert_eq!(config.agent.max_turns, 4);
        assert_eq!(config.agent.validation, ValidationMode::Permissive);
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_serializes_camel_case() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["agent"].get("maxTurns").is_some());
        assert!(raw["agent"].get("promptTemplate").is_some());
        assert!(raw["retry"].get("baseDelayMs").is_some());
        assert!(raw["provider"].get("apiBase").is_none());
        assert!(raw["agent"].get("sessionTimeoutSecs").is_none());
    }

    #[test]
    fn test_custom_api_base() {
        let provider = ProviderConfig {
            api_base: Some("http://localhost:8080/v1".into()),
            ..Default::default()
        };
        assert_eq!(provider.api_base_or_default(), "http://localhost:8080/v1");
    }
}
