//! HTTP implementation of the `ScanApi` port.

use std::time::Duration;

use anyhow::{Context, Result};
use scangate_common::{ScanReport, StartScanRequest, StartScanResponse};
use serde::de::DeserializeOwned;

use crate::application::ports::ScanApi;
use crate::domain::error::ApiError;

/// Timeout for a single request. The poll loop itself is unbounded.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the scan service over HTTPS with a bearer token.
pub struct HttpScanApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpScanApi {
    /// Build a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scangate/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn scans_url(&self) -> String {
        format!("{}/api/v1/scans", self.base_url)
    }
}

impl ScanApi for HttpScanApi {
    async fn start_scan(&self, request: &StartScanRequest) -> Result<StartScanResponse> {
        let url = self.scans_url();
        tracing::debug!(%url, repository = %request.target.repository, "starting scan");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_json(response).await
    }

    async fn poll_scan(&self, scan_id: &str) -> Result<ScanReport> {
        let url = format!("{}/{scan_id}", self.scans_url());
        tracing::debug!(%url, "polling scan");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &body).into());
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()).into())
}
