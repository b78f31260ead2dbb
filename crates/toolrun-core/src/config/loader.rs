//! Config loader — reads `~/.toolrun/config.json`, applies legacy migrations,
//! and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.toolrun/config.json` (or an explicit path)
//! 3. Environment variables `TOOLRUN_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ValidationMode};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `apiKey` → `provider.apiKey` unless the latter is set.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    let Some(key) = obj.remove("apiKey") else {
        return;
    };

    let provider = obj
        .entry("provider")
        .or_insert_with(|| serde_json::json!({}));
    if let Some(provider) = provider.as_object_mut() {
        if !provider.contains_key("apiKey") {
            provider.insert("apiKey".to_string(), key);
            debug!("Migrated apiKey → provider.apiKey");
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `TOOLRUN_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `TOOLRUN_AGENT__MODEL` → `agent.model`
/// - `TOOLRUN_AGENT__TEMPERATURE` → `agent.temperature`
/// - `TOOLRUN_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `TOOLRUN_AGENT__MAX_TURNS` → `agent.max_turns`
/// - `TOOLRUN_AGENT__VALIDATION` → `agent.validation` (`strict` / `permissive`)
/// - `TOOLRUN_AGENT__CALL_TIMEOUT_SECS` → `agent.call_timeout_secs`
/// - `TOOLRUN_AGENT__SESSION_TIMEOUT_SECS` → `agent.session_timeout_secs`
/// - `TOOLRUN_PROVIDER__API_KEY` → `provider.api_key`
/// - `TOOLRUN_PROVIDER__API_BASE` → `provider.api_base`
/// - `TOOLRUN_RETRY__MAX_ATTEMPTS` → `retry.max_attempts`
/// - `TOOLRUN_RETRY__BASE_DELAY_MS` → `retry.base_delay_ms`
/// - `TOOLRUN_RETRY__MAX_DELAY_MS` → `retry.max_delay_ms`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("TOOLRUN_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(t) = env_parse("TOOLRUN_AGENT__TEMPERATURE") {
        config.agent.temperature = t;
    }
    if let Some(n) = env_parse("TOOLRUN_AGENT__MAX_TOKENS") {
        config.agent.max_tokens = n;
    }
    if let Some(n) = env_parse("TOOLRUN_AGENT__MAX_TURNS") {
        config.agent.max_turns = n;
    }
    if let Ok(val) = std::env::var("TOOLRUN_AGENT__VALIDATION") {
        match val.to_ascii_lowercase().as_str() {
            "strict" => config.agent.validation = ValidationMode::Strict,
            "permissive" => config.agent.validation = ValidationMode::Permissive,
            other => warn!("Ignoring unknown validation mode: {}", other),
        }
    }
    if let Some(n) = env_parse("TOOLRUN_AGENT__CALL_TIMEOUT_SECS") {
        config.agent.call_timeout_secs = n;
    }
    if let Some(n) = env_parse("TOOLRUN_AGENT__SESSION_TIMEOUT_SECS") {
        config.agent.session_timeout_secs = Some(n);
    }

    if let Ok(val) = std::env::var("TOOLRUN_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("TOOLRUN_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    if let Some(n) = env_parse("TOOLRUN_RETRY__MAX_ATTEMPTS") {
        config.retry.max_attempts = n;
    }
    if let Some(n) = env_parse("TOOLRUN_RETRY__BASE_DELAY_MS") {
        config.retry.base_delay_ms = n;
    }
    if let Some(n) = env_parse("TOOLRUN_RETRY__MAX_DELAY_MS") {
        config.retry.max_delay_ms = n;
    }

    config
}

/// Read and parse an env var, ignoring it (with a warning) if malformed.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring malformed {}={}", name, val);
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
