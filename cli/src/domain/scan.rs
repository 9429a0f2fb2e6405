//! Scan lifecycle domain types: request construction, poll policy,
//! lifecycle events, terminal outcomes and the exit-code contract.
//!
//! This module is intentionally free of I/O and async.

use std::process::ExitCode;
use std::time::Duration;

use scangate_common::{ScanOptions, ScanReport, ScanTarget, StartScanRequest};

use crate::domain::error::{ApiError, ScanInputError};
use crate::domain::options::DEFAULT_POLL_INTERVAL;

/// Exit code when the scan completed but the quality gate did not pass.
pub const EXIT_GATE_FAILED: u8 = 10;

// ── Request construction ──────────────────────────────────────────────────────

/// Validates a commit id: 7–40 hex characters (abbreviated or full SHA-1) or
/// exactly 64 (SHA-256 repositories).
///
/// # Errors
///
/// Returns [`ScanInputError::InvalidCommit`] if the id has the wrong shape.
pub fn validate_commit_id(field: &'static str, id: &str) -> Result<(), ScanInputError> {
    let len = id.len();
    let valid_len = (7..=40).contains(&len) || len == 64;
    if !valid_len || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ScanInputError::InvalidCommit {
            field,
            value: id.to_string(),
        });
    }
    Ok(())
}

/// Build the start request, validating every identifier first.
///
/// # Errors
///
/// Returns the first [`ScanInputError`] found.
pub fn build_request(
    target: ScanTarget,
    options: ScanOptions,
) -> Result<StartScanRequest, ScanInputError> {
    let repository = target.repository.trim().to_string();
    if repository.is_empty() {
        return Err(ScanInputError::Empty("Repository"));
    }
    let branch = target.branch.trim().to_string();
    if branch.is_empty() {
        return Err(ScanInputError::Empty("Branch"));
    }
    let base_sha = target.base_sha.trim().to_string();
    let head_sha = target.head_sha.trim().to_string();
    validate_commit_id("base", &base_sha)?;
    validate_commit_id("head", &head_sha)?;

    Ok(StartScanRequest {
        target: ScanTarget {
            repository,
            base_sha,
            head_sha,
            branch,
        },
        options,
    })
}

// ── Poll policy ───────────────────────────────────────────────────────────────

/// Drives the poll loop: fixed interval plus optional caps.
///
/// With neither cap set the loop trusts the service to finish eventually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between the end of one poll and the start of the next.
    pub interval: Duration,
    /// Give up after this many poll calls.
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since polling began.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Unbounded policy with the given interval.
    #[must_use]
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::every(DEFAULT_POLL_INTERVAL)
    }
}

// ── Lifecycle events ──────────────────────────────────────────────────────────

/// Transition points of a scan, in the order they can occur.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// About to issue the start call.
    Starting { request: &'a StartScanRequest },
    /// The service accepted the scan.
    Started { scan_id: &'a str },
    /// The start call failed or returned no scan id.
    StartFailed { error: &'a anyhow::Error },
    /// About to enter the poll loop.
    Polling { scan_id: &'a str, interval: Duration },
    /// The service reported completion.
    Completed { scan_id: &'a str, report: &'a ScanReport },
    /// A poll call failed; polling stops.
    PollFailed { scan_id: &'a str, error: &'a anyhow::Error },
}

/// Why polling stopped without a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    AttemptsExhausted(u32),
    TimedOut(Duration),
}

/// Terminal state of one scan invocation.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed { scan_id: String, report: ScanReport },
    StartFailed(anyhow::Error),
    PollFailed { scan_id: String, error: anyhow::Error },
    Stopped { scan_id: String, reason: StopReason },
}

impl ScanOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Completed { report, .. } if report.gate_passed => ExitCode::SUCCESS,
            Self::Completed { .. } => ExitCode::from(EXIT_GATE_FAILED),
            _ => ExitCode::FAILURE,
        }
    }
}

/// Human-readable message for a failed start. A not-found response points
/// the user at the identifiers they passed.
#[must_use]
pub fn start_failure_message(error: &anyhow::Error) -> String {
    if matches!(error.downcast_ref::<ApiError>(), Some(ApiError::NotFound)) {
        return "Could not start scan: the service found no matching repository, commit or \
                branch. Double-check --repo, --base, --head and --branch."
            .to_string();
    }
    format!("Could not start scan: {error:#}")
}

/// Human-readable message for a failed poll.
#[must_use]
pub fn poll_failure_message(scan_id: &str, error: &anyhow::Error) -> String {
    format!("Could not fetch status of scan {scan_id}: {error:#}")
}

/// Human-readable message for a loop that stopped early.
#[must_use]
pub fn stop_message(scan_id: &str, reason: StopReason) -> String {
    match reason {
        StopReason::Cancelled => format!("Cancelled while waiting for scan {scan_id}"),
        StopReason::AttemptsExhausted(n) => {
            format!("Scan {scan_id} did not complete after {n} status checks")
        }
        StopReason::TimedOut(limit) => format!(
            "Scan {scan_id} did not complete within {}s",
            limit.as_secs_f64()
        ),
    }
}
