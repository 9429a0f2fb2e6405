//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::ScangateConfig;
use crate::domain::config::DEFAULT_API_URL;
use crate::domain::error::ScanInputError;

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<ScangateConfig> {
    store.load()
}

/// Validate and persist a single `key = value` setting.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<ScangateConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}

/// Connection settings after merging explicit overrides with the stored config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_url: String,
    pub token: String,
}

/// Resolve the API URL and token.
///
/// Explicit values (flag or environment) win over the config file; the
/// config file wins over the built-in default URL.
///
/// # Errors
///
/// Returns [`ScanInputError::MissingToken`] when no token is available, or an
/// error if the config file is needed but cannot be read.
pub fn resolve_credentials(
    store: &impl ConfigStore,
    api_url: Option<&str>,
    token: Option<&str>,
) -> Result<Credentials> {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let api_url = api_url.map(str::trim).filter(|u| !u.is_empty());

    // The file is only consulted for values not given explicitly.
    let config = match (token, api_url) {
        (Some(_), Some(_)) => None,
        _ => Some(store.load()?),
    };

    let token = token
        .map(str::to_owned)
        .or_else(|| {
            config
                .as_ref()
                .and_then(|c| c.api.token.clone())
                .filter(|t| !t.trim().is_empty())
        })
        .ok_or(ScanInputError::MissingToken)?;

    let api_url = api_url
        .map(str::to_owned)
        .or_else(|| config.map(|c| c.api.url))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    Ok(Credentials { api_url, token })
}
