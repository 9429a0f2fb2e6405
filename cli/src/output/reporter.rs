//! Presentation-layer implementations of `ScanEventSink`.
//!
//! `TerminalReporter` wraps `&OutputContext` and turns lifecycle events into
//! step lines or a spinner so the orchestrator never touches a presentation
//! type directly. `SilentReporter` only logs, for `--json` runs.

use std::cell::OnceCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ScanEventSink;
use crate::domain::ScanEvent;
use crate::output::{OutputContext, progress};

/// Terminal lifecycle reporter.
///
/// On a TTY a spinner tracks the scan while it runs; otherwise each
/// transition prints one `→` line (suppressed when `ctx.quiet`). Final
/// results and errors are rendered by the command, not here.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: OnceCell<ProgressBar>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: OnceCell::new(),
        }
    }

    fn step(&self, message: &str) {
        if let Some(pb) = self.spinner.get() {
            pb.set_message(message.to_string());
        } else if self.ctx.show_progress() {
            let _ = self.spinner.set(progress::spinner(message));
        } else if !self.ctx.quiet {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn done(&self, message: &str) {
        match self.spinner.get() {
            Some(pb) => progress::finish_ok(pb, message),
            None => self.ctx.success(message),
        }
    }

    fn abort(&self, message: &str) {
        if let Some(pb) = self.spinner.get() {
            progress::finish_error(pb, message);
        }
    }
}

impl ScanEventSink for TerminalReporter<'_> {
    fn emit(&self, event: &ScanEvent<'_>) {
        match event {
            ScanEvent::Starting { request } => {
                let t = &request.target;
                self.step(&format!(
                    "Starting scan of {} ({}..{}) on {}",
                    t.repository,
                    short_sha(&t.base_sha),
                    short_sha(&t.head_sha),
                    t.branch
                ));
            }
            ScanEvent::Started { scan_id } => {
                if let Some(pb) = self.spinner.get() {
                    let msg = format!("Scan {scan_id} started");
                    pb.suspend(|| self.ctx.success(&msg));
                } else {
                    self.ctx.success(&format!("Scan {scan_id} started"));
                }
            }
            ScanEvent::Polling { scan_id, interval } => {
                self.step(&format!(
                    "Waiting for scan {scan_id} (checking every {}s)",
                    interval.as_secs_f64()
                ));
            }
            ScanEvent::Completed { scan_id, .. } => self.done(&format!("Scan {scan_id} complete")),
            ScanEvent::StartFailed { .. } => self.abort("Scan not started"),
            ScanEvent::PollFailed { scan_id, .. } => {
                self.abort(&format!("Scan {scan_id} status unknown"));
            }
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.get() {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Reporter that writes nothing to stdout, keeping `--json` output clean.
pub struct SilentReporter;

impl ScanEventSink for SilentReporter {
    fn emit(&self, event: &ScanEvent<'_>) {
        match event {
            ScanEvent::Starting { request } => {
                tracing::info!(repository = %request.target.repository, "starting scan");
            }
            ScanEvent::Started { scan_id } => tracing::info!(%scan_id, "scan started"),
            ScanEvent::Polling { scan_id, interval } => {
                tracing::info!(%scan_id, interval_secs = interval.as_secs_f64(), "polling");
            }
            ScanEvent::Completed { scan_id, report } => {
                tracing::info!(%scan_id, gate_passed = report.gate_passed, "scan complete");
            }
            ScanEvent::StartFailed { error } => tracing::warn!(error = %error, "start failed"),
            ScanEvent::PollFailed { scan_id, error } => {
                tracing::warn!(%scan_id, error = %error, "poll failed");
            }
        }
    }
}

/// Abbreviate a commit id for display.
#[must_use]
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
