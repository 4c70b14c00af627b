use crate::client::models::ScanResultPayload;
use crate::errors::WebscanError;
use crate::report::finding::{Category, NormalizedFinding};
use crate::report::{normalize_all, ReportAggregate, ScanMetrics};
use crate::utils::formatting::{format_date, format_duration, format_time, hostname};

use super::layout::{colors, Color, DocumentBuilder, Page, PageGeometry, TextStyle};
use super::pdf;

/// Everything the document skeleton needs, derived once from a completed
/// result payload.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub url: String,
    pub scan_start: Option<String>,
    pub scan_end: Option<String>,
    pub duration_seconds: Option<f64>,
    pub findings: Vec<NormalizedFinding>,
    pub aggregate: ReportAggregate,
    pub metrics: ScanMetrics,
}

impl ScanReport {
    pub fn from_payload(payload: &ScanResultPayload) -> Self {
        let findings = normalize_all(&payload.vulnerabilities);
        let aggregate = ReportAggregate::compute(&findings, payload.total_urls_scanned());
        let metrics = ScanMetrics::resolve(payload);

        Self {
            url: payload.url.clone(),
            scan_start: payload
                .scan_start_time
                .clone()
                .or_else(|| payload.timestamp.clone()),
            scan_end: payload
                .scan_end_time
                .clone()
                .or_else(|| payload.timestamp.clone()),
            duration_seconds: payload.scan_duration_seconds,
            findings,
            aggregate,
            metrics,
        }
    }

    fn in_category(&self, category: Category) -> Vec<&NormalizedFinding> {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Sqli => colors::SQLI,
        Category::Xss => colors::XSS,
        Category::Csrf => colors::CSRF,
    }
}

fn category_fill(category: Category) -> Color {
    match category {
        Category::Sqli => colors::SQLI_FILL,
        Category::Xss => colors::XSS_FILL,
        Category::Csrf => colors::CSRF_FILL,
    }
}

/// Build the full report and serialize it to PDF bytes.
pub fn render_pdf(report: &ScanReport, geometry: PageGeometry) -> Result<Vec<u8>, WebscanError> {
    let pages = build_pages(report, geometry)?;
    pdf::render(&pages, geometry)
}

/// Lay out the fixed report skeleton: title, metadata, summary panel,
/// executive summary, severity table, per-category sections, payload
/// summary, performance metrics.
pub fn build_pages(
    report: &ScanReport,
    geometry: PageGeometry,
) -> Result<Vec<Page>, WebscanError> {
    let mut doc = DocumentBuilder::new(geometry)?;
    let agg = &report.aggregate;
    let metrics = &report.metrics;

    doc.write_title("SCANNING REPORT")?;

    doc.write_key_value("URL", &report.url, 0.0)?;
    doc.write_key_value("Scan Date", &format_date(report.scan_start.as_deref()), 0.0)?;
    doc.write_key_value(
        "Scan Start Time",
        &format_time(report.scan_start.as_deref()),
        0.0,
    )?;
    doc.write_key_value("Scan End Time", &format_time(report.scan_end.as_deref()), 0.0)?;
    doc.write_key_value("Scan Duration", &format_duration(report.duration_seconds), 0.0)?;
    doc.advance(2.0);

    draw_summary_panel(&mut doc, report)?;

    doc.write_section_title("Executive Summary", colors::TEXT)?;
    doc.write_key_value("Target Domain", &hostname(&report.url), 0.0)?;
    doc.write_key_value(
        "Total Requests Sent",
        &metrics.total_requests_sent.to_string(),
        0.0,
    )?;
    doc.write_key_value(
        "Total Forms Detected",
        &metrics.total_forms_detected.to_string(),
        0.0,
    )?;
    doc.write_key_value(
        "Total Input Parameters Tested",
        &metrics.total_params_tested.to_string(),
        0.0,
    )?;
    doc.advance(2.0);

    doc.write_wrapped(
        &format!("Security Posture: {}", agg.posture_statement()),
        0.0,
        9.0,
    )?;

    let sqli = report.in_category(Category::Sqli);
    let major: Vec<String> = if sqli.is_empty() {
        vec!["No critical findings reported.".to_string()]
    } else {
        sqli.iter()
            .take(5)
            .map(|f| format!("{} | {}", f.url, f.parameter))
            .collect()
    };
    doc.write_numbered_list("Major Critical Findings", &major, 0.0, 9.0)?;
    doc.advance(2.0);

    let content_width = geometry.content_width();

    doc.write_section_title("Severity Distribution", colors::TEXT)?;
    let severity_rows: Vec<Vec<String>> = crate::report::Severity::ORDERED
        .iter()
        .map(|s| vec![s.label().to_string(), agg.severity_count(*s).to_string()])
        .collect();
    doc.draw_table(
        &["Severity", "Count"],
        &severity_rows,
        &[120.0, content_width - 120.0],
        colors::TABLE_HEADER_FILL,
        colors::TABLE_HEADER_TEXT,
    )?;
    doc.advance(2.0);

    doc.write_section_title("Detailed Vulnerability Report", colors::TEXT)?;
    draw_sqli_section(&mut doc, report)?;
    draw_xss_section(&mut doc, report)?;
    draw_csrf_section(&mut doc, report)?;

    doc.write_section_title("Payload Testing Summary", colors::TEXT)?;
    doc.write_key_value(
        "Total Payloads Tested",
        &metrics.total_payloads_tested.to_string(),
        0.0,
    )?;
    doc.write_key_value(
        "Successful Payloads",
        &metrics.successful_payloads.to_string(),
        0.0,
    )?;
    doc.write_key_value(
        "Blocked Payloads",
        &metrics.blocked_payloads.to_string(),
        0.0,
    )?;
    let payload_rows: Vec<Vec<String>> = metrics
        .payload_entries
        .iter()
        .map(|p| {
            vec![
                p.vulnerability_type.clone(),
                p.payload_used.clone(),
                p.status.clone(),
                response_code_text(&p.response_code),
            ]
        })
        .collect();
    doc.draw_table(
        &["Vulnerability Type", "Payload Used", "Status", "Response Code"],
        &payload_rows,
        &[42.0, 95.0, 25.0, content_width - 162.0],
        colors::TABLE_HEADER_FILL,
        colors::TABLE_HEADER_TEXT,
    )?;

    doc.advance(2.0);
    doc.write_section_title("Performance Metrics", colors::TEXT)?;
    let perf_rows = vec![
        vec![
            "Total Requests Sent".to_string(),
            metrics.total_requests_sent.to_string(),
        ],
        vec![
            "Total Responses Received".to_string(),
            metrics.total_responses_received.to_string(),
        ],
        vec![
            "Average Response Time".to_string(),
            format!("{:.2} ms", metrics.average_response_time_ms),
        ],
        vec!["Scan Mode".to_string(), metrics.scan_mode.clone()],
        vec![
            "Thread Count Used".to_string(),
            metrics.thread_count_used.to_string(),
        ],
        vec![
            "Errors Encountered".to_string(),
            metrics.errors_encountered.to_string(),
        ],
    ];
    doc.draw_table(
        &["Metric", "Value"],
        &perf_rows,
        &[118.0, content_width - 118.0],
        colors::TABLE_HEADER_FILL,
        colors::TABLE_HEADER_TEXT,
    )?;

    Ok(doc.into_pages())
}

fn response_code_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => "-".to_string(),
    }
}

/// Bordered at-a-glance panel: counts per category, overall risk, server
/// type. Labels on the left, right-aligned values.
fn draw_summary_panel(doc: &mut DocumentBuilder, report: &ScanReport) -> Result<(), WebscanError> {
    const BOX_HEIGHT: f64 = 72.0;
    const ROW_STEP: f64 = 8.8;

    doc.ensure_space(BOX_HEIGHT + 8.0)?;

    let geometry = doc.geometry();
    let agg = &report.aggregate;
    let box_x = geometry.margin;
    let box_y = doc.cursor_y();
    let content_width = geometry.content_width();

    doc.rect(
        box_x,
        box_y,
        content_width,
        BOX_HEIGHT,
        Some(colors::SUMMARY_BOX_FILL),
        Some(colors::SUMMARY_BOX_BORDER),
    );

    let rows: Vec<(&str, String, Color)> = vec![
        (
            "URLs Scanned",
            agg.total_urls_scanned.to_string(),
            colors::TEXT,
        ),
        (
            "Total Vulnerabilities",
            agg.total_findings.to_string(),
            colors::TEXT,
        ),
        (
            "SQL Injection",
            agg.category_count(Category::Sqli).to_string(),
            colors::SQLI,
        ),
        (
            "Cross-Site Scripting",
            agg.category_count(Category::Xss).to_string(),
            colors::XSS,
        ),
        (
            "CSRF",
            agg.category_count(Category::Csrf).to_string(),
            colors::CSRF,
        ),
        (
            "Overall Risk Level",
            agg.overall_risk.label().to_string(),
            colors::TEXT,
        ),
        (
            "Server Type",
            report.metrics.server_type.clone(),
            colors::TEXT,
        ),
    ];

    let mut row_y = box_y + 8.0;
    for (label, value, label_color) in rows {
        doc.text_at(box_x + 4.0, row_y, label, TextStyle::bold(10.0, label_color));
        doc.text_right(
            box_x + content_width - 4.0,
            row_y,
            &value,
            TextStyle::bold(10.0, colors::TITLE),
        );
        row_y += ROW_STEP;
    }

    let advance = box_y + BOX_HEIGHT + 8.0 - doc.cursor_y();
    doc.advance(advance);
    Ok(())
}

fn draw_category_header(
    doc: &mut DocumentBuilder,
    title: &str,
    category: Category,
    report: &ScanReport,
) -> Result<(), WebscanError> {
    doc.write_section_title(title, category_color(category))?;
    doc.write_key_value(
        "Total Found",
        &report.aggregate.category_count(category).to_string(),
        0.0,
    )?;
    doc.write_key_value(
        "Highest Severity",
        report.aggregate.highest_severity(category).label(),
        0.0,
    )?;
    Ok(())
}

/// Per-finding detail block: colored bold identifier line, then key/values.
fn draw_finding_header(
    doc: &mut DocumentBuilder,
    finding: &NormalizedFinding,
    index: usize,
    reserve: f64,
) -> Result<(), WebscanError> {
    doc.ensure_space(reserve)?;
    let y = doc.cursor_y();
    doc.text_at(
        doc.geometry().margin,
        y,
        &format!("Vulnerability ID: {}", finding.report_id(index)),
        TextStyle::bold(10.0, category_color(finding.category)),
    );
    doc.advance(5.0);
    Ok(())
}

fn draw_sqli_section(doc: &mut DocumentBuilder, report: &ScanReport) -> Result<(), WebscanError> {
    let findings = report.in_category(Category::Sqli);
    let content_width = doc.geometry().content_width();

    draw_category_header(doc, "1. SQL INJECTION", Category::Sqli, report)?;

    let rows: Vec<Vec<String>> = findings
        .iter()
        .enumerate()
        .map(|(i, f)| {
            vec![
                f.report_id(i),
                f.url.clone(),
                f.parameter.clone(),
                f.severity.label().to_string(),
            ]
        })
        .collect();
    doc.draw_table(
        &["ID", "URL", "Parameter", "Severity"],
        &rows,
        &[22.0, 92.0, 38.0, content_width - 152.0],
        category_fill(Category::Sqli),
        category_color(Category::Sqli),
    )?;

    for (i, finding) in findings.iter().enumerate() {
        draw_finding_header(doc, finding, i, 36.0)?;
        doc.write_key_value("Affected URL", &finding.url, 0.0)?;
        doc.write_key_value("HTTP Method", "GET/POST", 0.0)?;
        doc.write_key_value("Vulnerable Parameter", &finding.parameter, 0.0)?;
        doc.write_key_value("Payload Used", &finding.payload, 0.0)?;
        doc.write_key_value("Detection Type", &finding.kind, 0.0)?;
        doc.write_key_value("Response Evidence", &finding.detail, 0.0)?;
        doc.write_key_value("Severity", finding.severity.label(), 0.0)?;
        doc.advance(1.0);
    }
    Ok(())
}

fn draw_xss_section(doc: &mut DocumentBuilder, report: &ScanReport) -> Result<(), WebscanError> {
    let findings = report.in_category(Category::Xss);
    let content_width = doc.geometry().content_width();

    draw_category_header(doc, "2. CROSS-SITE SCRIPTING (XSS)", Category::Xss, report)?;

    let rows: Vec<Vec<String>> = findings
        .iter()
        .enumerate()
        .map(|(i, f)| {
            vec![
                f.report_id(i),
                f.url.clone(),
                f.parameter.clone(),
                f.xss_kind().to_string(),
                f.severity.label().to_string(),
            ]
        })
        .collect();
    doc.draw_table(
        &["ID", "URL", "Parameter", "XSS Type", "Severity"],
        &rows,
        &[22.0, 70.0, 30.0, 45.0, content_width - 167.0],
        category_fill(Category::Xss),
        category_color(Category::Xss),
    )?;

    for (i, finding) in findings.iter().enumerate() {
        draw_finding_header(doc, finding, i, 36.0)?;
        doc.write_key_value("XSS Type", finding.xss_kind(), 0.0)?;
        doc.write_key_value("Affected URL", &finding.url, 0.0)?;
        doc.write_key_value("HTTP Method", "GET/POST", 0.0)?;
        doc.write_key_value("Vulnerable Parameter", &finding.parameter, 0.0)?;
        doc.write_key_value("Payload Used", &finding.payload, 0.0)?;
        doc.write_key_value("Reflected Evidence", &finding.detail, 0.0)?;
        doc.write_key_value("Severity", finding.severity.label(), 0.0)?;
        doc.advance(1.0);
    }
    Ok(())
}

fn draw_csrf_section(doc: &mut DocumentBuilder, report: &ScanReport) -> Result<(), WebscanError> {
    let findings = report.in_category(Category::Csrf);
    let content_width = doc.geometry().content_width();

    draw_category_header(
        doc,
        "3. CROSS-SITE REQUEST FORGERY (CSRF)",
        Category::Csrf,
        report,
    )?;

    let form_and_url = |f: &NormalizedFinding| {
        if f.url == "-" {
            f.parameter.clone()
        } else {
            format!("{} | {}", f.parameter, f.url)
        }
    };

    let rows: Vec<Vec<String>> = findings
        .iter()
        .enumerate()
        .map(|(i, f)| {
            vec![
                f.report_id(i),
                form_and_url(f),
                f.kind.clone(),
                f.severity.label().to_string(),
            ]
        })
        .collect();
    doc.draw_table(
        &["ID", "Affected Form/URL", "Issue Type", "Severity"],
        &rows,
        &[22.0, 90.0, 58.0, content_width - 170.0],
        category_fill(Category::Csrf),
        category_color(Category::Csrf),
    )?;

    for (i, finding) in findings.iter().enumerate() {
        draw_finding_header(doc, finding, i, 34.0)?;
        doc.write_key_value("Affected URL/Form", &form_and_url(finding), 0.0)?;
        doc.write_key_value("HTTP Method", "POST", 0.0)?;
        doc.write_key_value("Issue Type", &finding.kind, 0.0)?;
        doc.write_key_value("Evidence", &finding.detail, 0.0)?;
        doc.write_key_value("Severity", finding.severity.label(), 0.0)?;
        doc.advance(1.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{RawFinding, ScanResultPayload, VulnerabilitySet};

    fn sample_payload() -> ScanResultPayload {
        ScanResultPayload {
            url: "https://example.com".to_string(),
            timestamp: Some("2026-08-27T10:00:00Z".to_string()),
            scan_duration_seconds: Some(93.0),
            sitemap_urls: Some(vec!["https://example.com".into()]),
            vulnerabilities: VulnerabilitySet {
                sqli: vec![RawFinding {
                    parameter: Some("id".into()),
                    url: Some("https://example.com/item".into()),
                    payload: Some("' OR 1=1--".into()),
                    ..Default::default()
                }],
                xss: vec![RawFinding {
                    param: Some("q".into()),
                    kind: Some("stored".into()),
                    ..Default::default()
                }],
                csrf: vec![RawFinding {
                    form_name: Some("login".into()),
                    ..Default::default()
                }],
            },
            ..Default::default()
        }
    }

    #[test]
    fn report_derives_aggregate_and_metrics() {
        let report = ScanReport::from_payload(&sample_payload());
        assert_eq!(report.findings.len(), 3);
        assert_eq!(report.aggregate.total_findings, 3);
        assert_eq!(
            report.aggregate.overall_risk,
            crate::report::Severity::Critical
        );
        assert_eq!(report.metrics.total_payloads_tested, 3);
    }

    #[test]
    fn skeleton_builds_and_is_deterministic() {
        let report = ScanReport::from_payload(&sample_payload());
        let a = build_pages(&report, PageGeometry::A4).unwrap();
        let b = build_pages(&report, PageGeometry::A4).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.ops, pb.ops);
        }
    }

    #[test]
    fn empty_result_set_still_renders() {
        let payload = ScanResultPayload {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let report = ScanReport::from_payload(&payload);
        let bytes = render_pdf(&report, PageGeometry::A4).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
