//! JSON output helpers.
//!
//! Provides the renderer used by every `--json` code path and the
//! error-object formatter used when a command fails.

use anyhow::{Context, Result};
use scangate_common::ScanReport;

use crate::domain::{ScangateConfig, mask_token};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice: `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a completed scan as a JSON object.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(scan_id: &str, report: &ScanReport) -> Result<String> {
    let obj = serde_json::json!({
        "scan_id": scan_id,
        "gate_passed": report.gate_passed,
        "open_issues_found": report.open_issues_found,
        "issue_links": report.issue_links,
        "diff_url": report.diff_url,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render a completed scan.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, scan_id: &str, report: &ScanReport) -> Result<()> {
        println!("{}", format_report(scan_id, report)?);
        Ok(())
    }

    /// Render a failure object.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_failure(&self, message: &str, code: &str) -> Result<()> {
        println!("{}", format_error(message, code)?);
        Ok(())
    }

    /// Render the configuration with the token masked.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &ScangateConfig, path: &std::path::Path) -> Result<()> {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "api": {
                "url": config.api.url,
                "token": config.api.token.as_deref().map(mask_token),
            },
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// Render the CLI version.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        let obj = serde_json::json!({ "version": version });
        println!(
            "{}",
            serde_json::to_string(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }
}
