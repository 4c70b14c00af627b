use std::collections::HashSet;

use crate::client::models::{PayloadEntry, ScanResultPayload};
use crate::report::finding::Category;

/// Performance figures with every optional wire field resolved. Older
/// scanner builds omit the performance block entirely, so each value has a
/// derivation from the findings themselves.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    pub total_requests_sent: u64,
    pub total_responses_received: u64,
    pub average_response_time_ms: f64,
    pub scan_mode: String,
    pub thread_count_used: u32,
    pub errors_encountered: u32,
    pub total_forms_detected: u32,
    pub total_params_tested: u32,
    pub server_type: String,
    pub payload_entries: Vec<PayloadEntry>,
    pub total_payloads_tested: u32,
    pub successful_payloads: u32,
    pub blocked_payloads: u32,
}

impl ScanMetrics {
    pub fn resolve(payload: &ScanResultPayload) -> Self {
        let perf = payload.performance.clone().unwrap_or_default();
        let vulns = &payload.vulnerabilities;
        let total_urls = payload.total_urls_scanned() as u64;

        // Rough request estimate when the engine did not count: three
        // probes per crawled URL.
        let total_requests_sent = perf.total_requests_sent.unwrap_or(total_urls * 3);
        let total_responses_received = perf.total_responses_received.unwrap_or(total_requests_sent);

        let total_forms_detected = perf.total_forms_detected.unwrap_or_else(|| {
            vulns
                .csrf
                .iter()
                .filter_map(|v| v.form_name.as_deref())
                .filter(|s| !s.trim().is_empty())
                .collect::<HashSet<_>>()
                .len() as u32
        });

        let total_params_tested = perf.total_input_parameters_tested.unwrap_or_else(|| {
            vulns
                .sqli
                .iter()
                .chain(vulns.xss.iter())
                .filter_map(|v| v.parameter.as_deref().or(v.param.as_deref()))
                .filter(|s| !s.trim().is_empty())
                .collect::<HashSet<_>>()
                .len() as u32
        });

        let server_type = payload
            .server
            .as_ref()
            .and_then(|s| s.server_type.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let payload_metrics = perf.payload_metrics.unwrap_or_default();
        let payload_entries = payload_metrics
            .entries
            .unwrap_or_else(|| synthesize_payload_entries(payload));

        let total_payloads_tested = payload_metrics
            .total_payloads_tested
            .unwrap_or(payload_entries.len() as u32);
        let successful_payloads = payload_metrics.successful_payloads.unwrap_or_else(|| {
            payload_entries.iter().filter(|p| p.status != "Blocked").count() as u32
        });
        let blocked_payloads = payload_metrics.blocked_payloads.unwrap_or_else(|| {
            payload_entries.iter().filter(|p| p.status == "Blocked").count() as u32
        });

        Self {
            total_requests_sent,
            total_responses_received,
            average_response_time_ms: perf.average_response_time_ms.unwrap_or(0.0),
            scan_mode: perf.scan_mode.unwrap_or_else(|| "Async".to_string()),
            thread_count_used: perf.thread_count_used.unwrap_or(1),
            errors_encountered: perf.errors_encountered.unwrap_or(0),
            total_forms_detected,
            total_params_tested,
            server_type,
            payload_entries,
            total_payloads_tested,
            successful_payloads,
            blocked_payloads,
        }
    }
}

/// Build one payload-summary row per finding when the engine supplied no
/// payload metrics of its own.
fn synthesize_payload_entries(payload: &ScanResultPayload) -> Vec<PayloadEntry> {
    let vulns = &payload.vulnerabilities;
    let mut entries = Vec::new();

    for raw in &vulns.sqli {
        entries.push(PayloadEntry {
            vulnerability_type: Category::Sqli.display_name().to_string(),
            payload_used: raw.payload.clone().unwrap_or_else(|| "-".to_string()),
            status: "Successful".to_string(),
            response_code: serde_json::json!("200"),
        });
    }
    for raw in &vulns.xss {
        entries.push(PayloadEntry {
            vulnerability_type: Category::Xss.display_name().to_string(),
            payload_used: raw.payload.clone().unwrap_or_else(|| "-".to_string()),
            status: "Successful".to_string(),
            response_code: serde_json::json!("200"),
        });
    }
    for _ in &vulns.csrf {
        entries.push(PayloadEntry {
            vulnerability_type: Category::Csrf.display_name().to_string(),
            payload_used: "Form security test".to_string(),
            status: "Detected".to_string(),
            response_code: serde_json::json!("200"),
        });
    }

    entries
}
