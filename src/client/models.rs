use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request body for `POST /scan/async`, mirroring the scanner service contract.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
    pub url: String,
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<CustomConfig>,
    pub check_sqli: bool,
    pub check_xss: bool,
    pub check_csrf: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomConfig {
    pub max_urls: u32,
    pub depth_limit: u32,
    pub timeout: u32,
    pub verbose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartScanResponse {
    pub scan_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopScanResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
}

/// Remote job status as reported by `GET /scan/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Scanning,
    Completed,
    Error,
    Canceled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default, rename = "currentUrl")]
    pub current_url: Option<u32>,
    #[serde(default, rename = "totalUrls")]
    pub total_urls: Option<u32>,
    #[serde(default, rename = "currentPort")]
    pub current_port: Option<u32>,
    #[serde(default, rename = "totalPorts")]
    pub total_ports: Option<u32>,
    #[serde(default)]
    pub findings: Option<LiveCounts>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<ScanResultPayload>,
}

/// Running per-category finding counts streamed while the scan is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveCounts {
    #[serde(default)]
    pub sqli: u32,
    #[serde(default)]
    pub xss: u32,
    #[serde(default)]
    pub csrf: u32,
}

/// One raw finding record as emitted by the detection engine. Field names
/// vary between detector versions, so every field is optional here and
/// resolved during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFinding {
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default, rename = "formName")]
    pub form_name: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub vulnerability_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw finding lists keyed by category, as delivered in the result payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnerabilitySet {
    #[serde(default)]
    pub sqli: Vec<RawFinding>,
    #[serde(default)]
    pub xss: Vec<RawFinding>,
    #[serde(default)]
    pub csrf: Vec<RawFinding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default, rename = "type")]
    pub server_type: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayloadEntry {
    #[serde(rename = "vulnerabilityType")]
    pub vulnerability_type: String,
    #[serde(rename = "payloadUsed")]
    pub payload_used: String,
    pub status: String,
    #[serde(rename = "responseCode")]
    pub response_code: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayloadMetrics {
    #[serde(default)]
    pub total_payloads_tested: Option<u32>,
    #[serde(default)]
    pub successful_payloads: Option<u32>,
    #[serde(default)]
    pub blocked_payloads: Option<u32>,
    #[serde(default)]
    pub entries: Option<Vec<PayloadEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Performance {
    #[serde(default)]
    pub total_requests_sent: Option<u64>,
    #[serde(default)]
    pub total_responses_received: Option<u64>,
    #[serde(default)]
    pub average_response_time_ms: Option<f64>,
    #[serde(default)]
    pub scan_mode: Option<String>,
    #[serde(default)]
    pub thread_count_used: Option<u32>,
    #[serde(default)]
    pub errors_encountered: Option<u32>,
    #[serde(default)]
    pub total_forms_detected: Option<u32>,
    #[serde(default)]
    pub total_input_parameters_tested: Option<u32>,
    #[serde(default)]
    pub payload_metrics: Option<PayloadMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapData {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default, rename = "totalUrls")]
    pub total_urls: u32,
}

/// The full result payload attached to a completed status response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResultPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub scan_start_time: Option<String>,
    #[serde(default)]
    pub scan_end_time: Option<String>,
    #[serde(default)]
    pub scan_duration_seconds: Option<f64>,
    #[serde(default)]
    pub server: Option<ServerInfo>,
    #[serde(default)]
    pub performance: Option<Performance>,
    #[serde(default)]
    pub vulnerabilities: VulnerabilitySet,
    #[serde(default, rename = "sitemapData")]
    pub sitemap_data: Option<SitemapData>,
    #[serde(default)]
    pub sitemap_urls: Option<Vec<String>>,
}

impl ScanResultPayload {
    /// Number of URLs covered by the crawl, preferring explicit sitemap data.
    pub fn total_urls_scanned(&self) -> usize {
        if let Some(data) = &self.sitemap_data {
            return data.total_urls as usize;
        }
        self.sitemap_urls.as_ref().map(|u| u.len()).unwrap_or(0)
    }
}

/// One historical scan entry for a target URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub summary: HashMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub url: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub total_scans: usize,
}

/// Category-keyed improvement/regression lists from `GET /compare`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanComparison {
    #[serde(default)]
    pub improvements: HashMap<String, Vec<RawFinding>>,
    #[serde(default)]
    pub regressions: HashMap<String, Vec<RawFinding>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    pub url: String,
    #[serde(default)]
    pub comparison: ScanComparison,
}
