//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;
use scangate_common::ScanReport;

use crate::domain::{ScangateConfig, mask_token};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("scangate {version}");
    }

    /// Render the result of a completed scan.
    ///
    /// A failed gate is printed even in quiet mode: it is the reason the
    /// process exits non-zero.
    pub fn render_report(&self, scan_id: &str, report: &ScanReport) {
        if self.ctx.quiet && report.gate_passed {
            return;
        }
        println!();
        if report.gate_passed {
            self.ctx.success(&format!("Quality gate passed (scan {scan_id})"));
            if report.open_issues_found == 0 {
                return;
            }
        } else {
            println!(
                "  {} {}",
                "✗".style(self.ctx.styles.error),
                format!("Quality gate failed (scan {scan_id})").style(self.ctx.styles.bold)
            );
        }

        println!(
            "  {:<14} {}",
            "Open issues:".style(self.ctx.styles.dim),
            report.open_issues_found
        );
        if !report.issue_links.is_empty() {
            println!("  {}", "Issues:".style(self.ctx.styles.dim));
            for link in &report.issue_links {
                println!("    - {}", link.style(self.ctx.styles.link));
            }
        }
        if let Some(diff) = &report.diff_url {
            println!(
                "  {:<14} {}",
                "Diff:".style(self.ctx.styles.dim),
                diff.style(self.ctx.styles.link)
            );
        }
    }

    /// Render a terminal failure to stderr.
    pub fn render_failure(&self, message: &str) {
        self.ctx.error(message);
    }

    /// Render the current scangate configuration.
    pub fn render_config(&self, config: &ScangateConfig, path: &std::path::Path) {
        let unset = || "(not set)".to_string();
        println!();
        self.ctx.header(&format!("Configuration ({})", path.display()));
        println!();
        self.ctx.kv(&format!("{:<18}", "api.url:"), &config.api.url);
        self.ctx.kv(
            &format!("{:<18}", "api.token:"),
            &config.api.token.as_deref().map_or_else(unset, mask_token),
        );
        println!();
        self.ctx.header("Environment:");
        for var in ["SCANGATE_CONFIG", "SCANGATE_API_URL", "NO_COLOR"] {
            self.ctx.kv(
                &format!("{:<18}", format!("{var}:")),
                &std::env::var(var).unwrap_or_else(|_| unset()),
            );
        }
        self.ctx.kv(
            &format!("{:<18}", "SCANGATE_TOKEN:"),
            &std::env::var("SCANGATE_TOKEN").map_or_else(|_| unset(), |t| mask_token(&t)),
        );
        println!();
    }
}
