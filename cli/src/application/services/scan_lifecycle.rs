//! Application service: scan start → poll → complete lifecycle.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::anyhow;
use scangate_common::StartScanRequest;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ScanApi, ScanEventSink};
use crate::domain::error::ApiError;
use crate::domain::{PollPolicy, ScanEvent, ScanOutcome, StopReason};

/// Run one scan to a terminal outcome.
///
/// Issues exactly one start call, then polls `api` one call at a time until
/// the service reports completion, a call fails, the policy gives up, or
/// `cancel` fires. Errors are never retried. Every transition is reported to
/// `sink` before the outcome is returned.
pub async fn run_scan(
    api: &impl ScanApi,
    sink: &impl ScanEventSink,
    request: &StartScanRequest,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> ScanOutcome {
    sink.emit(&ScanEvent::Starting { request });

    let started = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        res = api.start_scan(request) => Some(res),
    };
    let scan_id = match started {
        None => {
            let error = anyhow!("cancelled before the service accepted the scan");
            sink.emit(&ScanEvent::StartFailed { error: &error });
            return ScanOutcome::StartFailed(error);
        }
        Some(Ok(resp)) => match resp.handle() {
            Some(id) => id.to_owned(),
            None => {
                let error = anyhow::Error::from(ApiError::MissingScanId);
                sink.emit(&ScanEvent::StartFailed { error: &error });
                return ScanOutcome::StartFailed(error);
            }
        },
        Some(Err(error)) => {
            sink.emit(&ScanEvent::StartFailed { error: &error });
            return ScanOutcome::StartFailed(error);
        }
    };

    tracing::debug!(scan_id = %scan_id, "scan started");
    sink.emit(&ScanEvent::Started { scan_id: &scan_id });
    sink.emit(&ScanEvent::Polling {
        scan_id: &scan_id,
        interval: policy.interval,
    });

    poll_until_done(api, sink, scan_id, policy, cancel).await
}

async fn poll_until_done(
    api: &impl ScanApi,
    sink: &impl ScanEventSink,
    scan_id: String,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> ScanOutcome {
    // A timeout too large to represent as an instant never expires.
    let deadline = policy
        .timeout
        .and_then(|limit| Instant::now().checked_add(limit));
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let polled = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            res = api.poll_scan(&scan_id) => Some(res),
        };

        match polled {
            None => return stopped(scan_id, StopReason::Cancelled),
            Some(Err(error)) => {
                tracing::debug!(scan_id = %scan_id, attempts, error = %error, "poll failed");
                sink.emit(&ScanEvent::PollFailed {
                    scan_id: &scan_id,
                    error: &error,
                });
                return ScanOutcome::PollFailed { scan_id, error };
            }
            Some(Ok(report)) if report.complete => {
                tracing::debug!(
                    scan_id = %scan_id,
                    attempts,
                    gate_passed = report.gate_passed,
                    "scan complete"
                );
                sink.emit(&ScanEvent::Completed {
                    scan_id: &scan_id,
                    report: &report,
                });
                return ScanOutcome::Completed { scan_id, report };
            }
            Some(Ok(_)) => tracing::debug!(scan_id = %scan_id, attempts, "scan still running"),
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return stopped(scan_id, StopReason::AttemptsExhausted(attempts));
        }
        if let (Some(deadline), Some(limit)) = (deadline, policy.timeout) {
            let next_poll = Instant::now().checked_add(policy.interval);
            if next_poll.is_none_or(|next| next > deadline) {
                return stopped(scan_id, StopReason::TimedOut(limit));
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return stopped(scan_id, StopReason::Cancelled),
            () = tokio::time::sleep(policy.interval) => {}
        }
    }
}

fn stopped(scan_id: String, reason: StopReason) -> ScanOutcome {
    tracing::debug!(scan_id = %scan_id, ?reason, "polling stopped");
    ScanOutcome::Stopped { scan_id, reason }
}
