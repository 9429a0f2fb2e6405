//! Option translation: splits user-facing scan flags into the bag forwarded to
//! the service and the knobs that only affect local behaviour.
//!
//! Pure functions only: no I/O, no async.

use std::time::Duration;

use scangate_common::{ScanOptions, Scanner, Severity};

use crate::domain::error::ScanInputError;

/// Poll interval used when the caller does not supply one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Flat, user-facing scan options as collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFlags {
    pub pr_title: Option<String>,
    pub pr_url: Option<String>,
    pub scanners: Option<Vec<Scanner>>,
    pub fail_on_blocking: Option<bool>,
    pub fail_on_secrets: Option<bool>,
    pub fail_on_pii: Option<bool>,
    pub min_severity: Option<Severity>,
    /// Raw poll interval in seconds, validated by [`translate`].
    pub poll_interval: Option<String>,
}

/// Options that never leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOptions {
    pub poll_interval: Duration,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Partition `flags` into the remote option bag and local options.
///
/// # Errors
///
/// Returns [`ScanInputError::InvalidPollInterval`] if a poll interval was
/// supplied but is not a positive number of seconds.
pub fn translate(flags: ScanFlags) -> Result<(ScanOptions, LocalOptions), ScanInputError> {
    let poll_interval = match flags.poll_interval.as_deref() {
        Some(raw) => parse_poll_interval(raw)?,
        None => DEFAULT_POLL_INTERVAL,
    };

    let remote = ScanOptions {
        pr_title: flags.pr_title.filter(|s| !s.trim().is_empty()),
        pr_url: flags.pr_url.filter(|s| !s.trim().is_empty()),
        scanners: flags.scanners.filter(|s| !s.is_empty()).map(dedup_scanners),
        fail_on_blocking: flags.fail_on_blocking,
        fail_on_secrets: flags.fail_on_secrets,
        fail_on_pii: flags.fail_on_pii,
        min_severity: flags.min_severity,
    };

    Ok((remote, LocalOptions { poll_interval }))
}

/// Parse a poll interval given in seconds. Fractions are accepted.
///
/// # Errors
///
/// Returns an error for non-numeric, non-finite, zero or negative input.
pub fn parse_poll_interval(raw: &str) -> Result<Duration, ScanInputError> {
    let invalid = || ScanInputError::InvalidPollInterval(raw.to_string());
    let secs: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    let interval = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
    if interval.is_zero() {
        return Err(invalid());
    }
    Ok(interval)
}

fn dedup_scanners(scanners: Vec<Scanner>) -> Vec<Scanner> {
    let mut out = Vec::with_capacity(scanners.len());
    for s in scanners {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
