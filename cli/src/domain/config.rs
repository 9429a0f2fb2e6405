//! Domain types and validators for scangate configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["api.url", "api.token"];
pub const DEFAULT_API_URL: &str = "https://api.scangate.dev";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.scangate/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScangateConfig {
    /// Remote service settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the scan service.
    #[serde(default = "default_api_url")]
    pub url: String,
    /// API token sent as a bearer credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl ScangateConfig {
    /// Apply a validated `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "api.url" => self.api.url = value.trim_end_matches('/').to_string(),
            "api.token" => self.api.token = Some(value.trim().to_string()),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

/// Mask a secret for display, keeping only the last four characters.
#[must_use]
pub fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("****{tail}")
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let reason = match key {
        "api.url" if !(value.starts_with("https://") || value.starts_with("http://")) => {
            Some("must start with http:// or https://")
        }
        "api.token" if value.trim().is_empty() => Some("must not be empty"),
        _ => None,
    };
    if let Some(reason) = reason {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
