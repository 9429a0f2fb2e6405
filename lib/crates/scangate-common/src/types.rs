use serde::{Deserialize, Serialize};

/// Minimum severity an issue must have to count against the quality gate.
///
/// Variants are declared in ascending order so `Ord` follows severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Scanner families the service can run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Scanner {
    /// Static application security testing
    Sast,
    /// Hard-coded credentials
    Secrets,
    /// Personally identifiable information
    Pii,
    /// Vulnerable third-party dependencies
    Dependencies,
}

/// Identifies the change under scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanTarget {
    /// Repository identifier, e.g. `acme/payments`.
    pub repository: String,
    pub base_sha: String,
    pub head_sha: String,
    pub branch: String,
}

/// Options forwarded verbatim to the start call.
///
/// Every field is optional and omitted from the request body when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanners: Option<Vec<Scanner>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_blocking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_secrets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_pii: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<Severity>,
}

/// Body of `POST /api/v1/scans`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartScanRequest {
    #[serde(flatten)]
    pub target: ScanTarget,
    #[serde(flatten)]
    pub options: ScanOptions,
}

/// Response of `POST /api/v1/scans`.
///
/// `scan_id` is optional on the wire: a response without one is a failed start.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartScanResponse {
    #[serde(default)]
    pub scan_id: Option<String>,
}

impl StartScanResponse {
    /// Returns the scan handle if the service issued a non-empty one.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.scan_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Snapshot returned by `GET /api/v1/scans/{scan_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanReport {
    /// `true` once the service has finished evaluating the change.
    pub complete: bool,
    /// Quality gate decision. Only meaningful when `complete` is set.
    #[serde(default)]
    pub gate_passed: bool,
    #[serde(default)]
    pub open_issues_found: u64,
    #[serde(default)]
    pub issue_links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_url: Option<String>,
}
