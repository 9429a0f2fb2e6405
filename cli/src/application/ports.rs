//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared wire types;
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;
use scangate_common::{ScanReport, StartScanRequest, StartScanResponse};

use crate::domain::{ScanEvent, ScangateConfig};

// ── Scan service port ─────────────────────────────────────────────────────────

/// The two calls the remote scan service exposes.
///
/// Implementations map transport and HTTP failures to
/// [`crate::domain::ApiError`] so callers can tell a not-found response apart
/// from other failures.
#[allow(async_fn_in_trait)]
pub trait ScanApi {
    /// Ask the service to scan the change described by `request`.
    async fn start_scan(&self, request: &StartScanRequest) -> Result<StartScanResponse>;
    /// Fetch the current state of a previously started scan.
    async fn poll_scan(&self, scan_id: &str) -> Result<ScanReport>;
}

// ── Lifecycle event port ──────────────────────────────────────────────────────

/// Receives lifecycle events as the orchestrator moves between states.
/// Sync trait: presentation only, never blocks the loop.
pub trait ScanEventSink {
    /// Handle one lifecycle event.
    fn emit(&self, event: &ScanEvent<'_>);
}

// ── Configuration port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence (load/save).
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<ScangateConfig>;
    /// Persist the configuration.
    fn save(&self, config: &ScangateConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
