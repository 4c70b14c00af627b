pub mod models;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::WebscanError;
use models::{
    CompareResponse, HistoryResponse, ScanRequest, StartScanResponse, StatusResponse,
    StopScanResponse,
};

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// The remote scanner service contract. The scanning engine itself is an
/// external collaborator; this trait is the only surface the session
/// tracker and CLI talk to, which also makes the tracker testable against
/// a scripted implementation.
#[async_trait]
pub trait ScanService: Send + Sync {
    async fn submit_scan(&self, request: &ScanRequest) -> Result<StartScanResponse, WebscanError>;
    async fn get_status(&self, scan_id: &str) -> Result<StatusResponse, WebscanError>;
    async fn stop_scan(&self, scan_id: &str) -> Result<StopScanResponse, WebscanError>;
    async fn fetch_history(&self, url: &str) -> Result<HistoryResponse, WebscanError>;
    async fn compare_scans(
        &self,
        url: &str,
        scan_a: Option<usize>,
        scan_b: Option<usize>,
    ) -> Result<CompareResponse, WebscanError>;
}

/// HTTP implementation backed by the scanner's REST API.
pub struct HttpScanService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScanService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract the service's own error message from a non-2xx JSON body,
    /// falling back to the HTTP status line.
    async fn error_body(resp: reqwest::Response) -> String {
        let status = resp.status();
        match resp.json::<serde_json::Value>().await {
            Ok(body) => body["error"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("service returned {}", status)),
            Err(_) => format!("service returned {}", status),
        }
    }
}

#[async_trait]
impl ScanService for HttpScanService {
    async fn submit_scan(&self, request: &ScanRequest) -> Result<StartScanResponse, WebscanError> {
        debug!(url = %request.url, profile = %request.profile, "Submitting scan");
        let resp = self
            .client
            .post(self.endpoint("/scan/async"))
            .json(request)
            .send()
            .await
            .map_err(|e| WebscanError::Submission(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WebscanError::Submission(Self::error_body(resp).await));
        }

        resp.json::<StartScanResponse>()
            .await
            .map_err(|e| WebscanError::Submission(format!("invalid response: {}", e)))
    }

    async fn get_status(&self, scan_id: &str) -> Result<StatusResponse, WebscanError> {
        let resp = self
            .client
            .get(self.endpoint("/scan/status"))
            .query(&[("scan_id", scan_id)])
            .send()
            .await
            .map_err(|e| WebscanError::PollTransport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WebscanError::PollTransport(Self::error_body(resp).await));
        }

        resp.json::<StatusResponse>()
            .await
            .map_err(|e| WebscanError::PollTransport(format!("invalid response: {}", e)))
    }

    async fn stop_scan(&self, scan_id: &str) -> Result<StopScanResponse, WebscanError> {
        let resp = self
            .client
            .post(self.endpoint("/scan/stop"))
            .json(&serde_json::json!({ "scan_id": scan_id }))
            .send()
            .await
            .map_err(|e| WebscanError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WebscanError::Network(Self::error_body(resp).await));
        }

        resp.json::<StopScanResponse>()
            .await
            .map_err(|e| WebscanError::Network(format!("invalid response: {}", e)))
    }

    async fn fetch_history(&self, url: &str) -> Result<HistoryResponse, WebscanError> {
        let resp = self
            .client
            .get(self.endpoint("/history"))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| WebscanError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WebscanError::Network(Self::error_body(resp).await));
        }

        resp.json::<HistoryResponse>()
            .await
            .map_err(|e| WebscanError::Network(format!("invalid response: {}", e)))
    }

    async fn compare_scans(
        &self,
        url: &str,
        scan_a: Option<usize>,
        scan_b: Option<usize>,
    ) -> Result<CompareResponse, WebscanError> {
        let mut query: Vec<(&str, String)> = vec![("url", url.to_string())];
        if let Some(a) = scan_a {
            query.push(("scan1", a.to_string()));
        }
        if let Some(b) = scan_b {
            query.push(("scan2", b.to_string()));
        }

        let resp = self
            .client
            .get(self.endpoint("/compare"))
            .query(&query)
            .send()
            .await
            .map_err(|e| WebscanError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(WebscanError::Network(Self::error_body(resp).await));
        }

        resp.json::<CompareResponse>()
            .await
            .map_err(|e| WebscanError::Network(format!("invalid response: {}", e)))
    }
}
