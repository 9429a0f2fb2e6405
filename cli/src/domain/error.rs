//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `reqwest`, or `std::fs`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Scan input errors ─────────────────────────────────────────────────────────

/// User-input problems detected before any remote call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanInputError {
    #[error("Invalid poll interval '{0}': must be a positive number of seconds.")]
    InvalidPollInterval(String),

    #[error("Invalid {field} commit '{value}': expected 7-40 or 64 hexadecimal characters.")]
    InvalidCommit { field: &'static str, value: String },

    #[error("{0} must not be empty.")]
    Empty(&'static str),

    #[error("No API token configured. Run 'scangate login' or set SCANGATE_TOKEN.")]
    MissingToken,
}

// ── Remote API errors ─────────────────────────────────────────────────────────

/// Failures talking to the scan service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found (HTTP 404)")]
    NotFound,

    #[error("unauthorized (HTTP {0}); check your API token")]
    Unauthorized(u16),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("service did not return a scan id")]
    MissingScanId,
}

impl ApiError {
    /// Map an HTTP status and body to the matching variant.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => Self::NotFound,
            401 | 403 => Self::Unauthorized(status),
            _ => Self::Status {
                status,
                message: summarize_body(body),
            },
        }
    }
}

/// First line of a response body, capped so HTML error pages stay readable.
fn summarize_body(body: &str) -> String {
    const MAX: usize = 200;
    let line = body.trim().lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "(empty response)".to_string();
    }
    if line.chars().count() > MAX {
        let cut: String = line.chars().take(MAX).collect();
        return format!("{cut}…");
    }
    line.to_string()
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
