//! `scangate scan`: start a remote scan, wait for it, and gate on the result.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use scangate_common::{ScanTarget, Scanner, Severity, StartScanRequest};
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service::{self, Credentials};
use crate::application::services::scan_lifecycle::run_scan;
use crate::domain::error::{ApiError, ScanInputError};
use crate::domain::scan::{poll_failure_message, start_failure_message, stop_message};
use crate::domain::{PollPolicy, ScanFlags, ScanOutcome, StopReason, build_request, translate};
use crate::infra::api::HttpScanApi;
use crate::output::{Renderer, SilentReporter, TerminalReporter};

/// Arguments for the scan command.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Repository identifier, e.g. acme/payments
    #[arg(long, value_name = "REPO")]
    pub repo: String,

    /// Base commit of the change
    #[arg(long, value_name = "SHA")]
    pub base: String,

    /// Head commit of the change
    #[arg(long, value_name = "SHA")]
    pub head: String,

    /// Branch the head commit belongs to
    #[arg(long)]
    pub branch: String,

    /// Pull request title
    #[arg(long)]
    pub pr_title: Option<String>,

    /// Pull request URL
    #[arg(long)]
    pub pr_url: Option<String>,

    /// Run only these scanners (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub scanners: Vec<Scanner>,

    /// Fail the gate on blocking issues (default)
    #[arg(long, overrides_with = "no_fail_on_blocking")]
    pub fail_on_blocking: bool,

    /// Do not fail the gate on blocking issues
    #[arg(long, overrides_with = "fail_on_blocking")]
    pub no_fail_on_blocking: bool,

    /// Fail the gate when secrets are found
    #[arg(long)]
    pub fail_on_secrets: bool,

    /// Fail the gate when PII is found
    #[arg(long)]
    pub fail_on_pii: bool,

    /// Ignore issues below this severity
    #[arg(long, value_enum)]
    pub min_severity: Option<Severity>,

    /// Seconds between status checks [default: 5]
    #[arg(long, value_name = "SECONDS", allow_hyphen_values = true)]
    pub poll_interval: Option<String>,

    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: Option<u32>,

    /// Scan service base URL
    #[arg(long, env = "SCANGATE_API_URL")]
    pub api_url: Option<String>,

    /// API token
    #[arg(long, env = "SCANGATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl ScanArgs {
    fn flags(&self) -> ScanFlags {
        ScanFlags {
            pr_title: self.pr_title.clone(),
            pr_url: self.pr_url.clone(),
            scanners: Some(self.scanners.clone()),
            fail_on_blocking: Some(!self.no_fail_on_blocking),
            fail_on_secrets: self.fail_on_secrets.then_some(true),
            fail_on_pii: self.fail_on_pii.then_some(true),
            min_severity: self.min_severity,
            poll_interval: self.poll_interval.clone(),
        }
    }
}

/// Everything needed to talk to the service, validated up front.
#[derive(Debug)]
pub struct PreparedScan {
    pub request: StartScanRequest,
    pub policy: PollPolicy,
    pub credentials: Credentials,
}

/// Validate user input and resolve credentials without touching the network.
///
/// # Errors
///
/// Returns a user-input error for a bad poll interval, commit id, empty
/// identifier or missing token.
pub fn prepare(store: &impl ConfigStore, args: &ScanArgs) -> Result<PreparedScan> {
    let (options, local) = translate(args.flags())?;
    let request = build_request(
        ScanTarget {
            repository: args.repo.clone(),
            base_sha: args.base.clone(),
            head_sha: args.head.clone(),
            branch: args.branch.clone(),
        },
        options,
    )?;
    let credentials =
        config_service::resolve_credentials(store, args.api_url.as_deref(), args.token.as_deref())?;

    let policy = PollPolicy {
        interval: local.poll_interval,
        max_attempts: args.max_polls,
        timeout: args.timeout.map(Duration::from_secs),
    };
    Ok(PreparedScan {
        request,
        policy,
        credentials,
    })
}

/// Run the scan command.
pub async fn run(app: &AppContext, args: ScanArgs) -> Result<ExitCode> {
    let renderer = app.renderer();
    let prepared = match prepare(&app.config_store, &args) {
        Ok(prepared) => prepared,
        Err(e) => {
            let code = if e.downcast_ref::<ScanInputError>().is_some() {
                "invalid_input"
            } else {
                "config_error"
            };
            renderer.render_failure(&format!("{e:#}"), code)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::debug!(
        api_url = %prepared.credentials.api_url,
        interval_secs = prepared.policy.interval.as_secs_f64(),
        "scan prepared"
    );

    let api = HttpScanApi::new(&prepared.credentials.api_url, &prepared.credentials.token)?;
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let outcome = if app.is_json() {
        run_scan(&api, &SilentReporter, &prepared.request, &prepared.policy, &cancel).await
    } else {
        let reporter = TerminalReporter::new(&app.output);
        run_scan(&api, &reporter, &prepared.request, &prepared.policy, &cancel).await
    };
    ctrl_c.abort();

    render_outcome(&renderer, &outcome)?;
    Ok(outcome.exit_code())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::debug!("interrupt received");
        cancel.cancel();
    }
}

/// Print the terminal outcome in the active output mode.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_outcome(renderer: &Renderer<'_>, outcome: &ScanOutcome) -> Result<()> {
    match outcome {
        ScanOutcome::Completed { scan_id, report } => renderer.render_report(scan_id, report),
        ScanOutcome::StartFailed(error) => {
            let code = match error.downcast_ref::<ApiError>() {
                Some(ApiError::NotFound) => "not_found",
                Some(ApiError::Unauthorized(_)) => "unauthorized",
                _ => "start_failed",
            };
            renderer.render_failure(&start_failure_message(error), code)
        }
        ScanOutcome::PollFailed { scan_id, error } => {
            renderer.render_failure(&poll_failure_message(scan_id, error), "poll_failed")
        }
        ScanOutcome::Stopped { scan_id, reason } => {
            let code = match reason {
                StopReason::Cancelled => "cancelled",
                StopReason::AttemptsExhausted(_) | StopReason::TimedOut(_) => "timeout",
            };
            renderer.render_failure(&stop_message(scan_id, *reason), code)
        }
    }
}
