use serde::{Deserialize, Serialize};

use crate::client::models::RawFinding;

/// Severity level for a finding, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ORDERED: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Returns a numeric rank where lower values indicate higher severity.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of vulnerability categories the scanner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sqli,
    Xss,
    Csrf,
}

impl Category {
    pub const ORDERED: [Category; 3] = [Category::Sqli, Category::Xss, Category::Csrf];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Sqli => "SQL Injection",
            Category::Xss => "Cross-Site Scripting",
            Category::Csrf => "CSRF",
        }
    }

    /// Prefix used for per-finding identifiers in the report (SQLI-001, ...).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Category::Sqli => "SQLI",
            Category::Xss => "XSS",
            Category::Csrf => "CSRF",
        }
    }

    /// Severity assigned when the raw record carries no recognizable one.
    pub fn default_severity(&self) -> Severity {
        match self {
            Category::Sqli => Severity::Critical,
            Category::Xss => Severity::High,
            Category::Csrf => Severity::Medium,
        }
    }

    /// Detection-type label used when the raw record names none.
    pub fn default_kind(&self) -> &'static str {
        match self {
            Category::Sqli => "Error-based / Time-based / Boolean-based",
            Category::Xss => "Reflected XSS",
            Category::Csrf => "Missing Token / POST over HTTP / No Referer Validation",
        }
    }

    /// Evidence text used when the raw record carries no detail.
    pub fn default_detail(&self) -> &'static str {
        match self {
            Category::Sqli => "Unexpected response behavior observed.",
            Category::Xss => "Payload reflected in response context.",
            Category::Csrf => "Anti-CSRF control validation failed.",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A finding after normalization: every field resolved, sanitized, and
/// severity-classified. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFinding {
    pub category: Category,
    pub url: String,
    pub parameter: String,
    pub payload: String,
    pub severity: Severity,
    /// Detection type, e.g. "Reflected XSS" or "Error-based".
    pub kind: String,
    pub detail: String,
}

impl NormalizedFinding {
    /// Report identifier such as `XSS-003` (1-based index within category).
    pub fn report_id(&self, index: usize) -> String {
        format!("{}-{:03}", self.category.id_prefix(), index + 1)
    }

    /// XSS sub-kind derived from the detection type string. Reflected is
    /// the default when nothing more specific is named.
    pub fn xss_kind(&self) -> &'static str {
        let lower = self.kind.to_lowercase();
        if lower.contains("stored") {
            "Stored XSS"
        } else if lower.contains("dom") {
            "DOM-based XSS"
        } else {
            "Reflected XSS"
        }
    }
}

/// Strip everything outside printable ASCII and trim whitespace. Layout
/// width math and the PDF text encoding both rely on this.
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| (' '..='~').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn first_nonempty<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Map one raw record into the canonical schema. Deterministic: the same
/// raw record always produces the same normalized finding.
pub fn normalize(raw: &RawFinding, category: Category) -> NormalizedFinding {
    let parameter = first_nonempty(&[&raw.parameter, &raw.param])
        .or_else(|| first_nonempty(&[&raw.form_name, &raw.component]))
        .map(sanitize_text)
        .unwrap_or_else(|| "-".to_string());

    let url = first_nonempty(&[&raw.url])
        .map(sanitize_text)
        .unwrap_or_else(|| "-".to_string());

    let payload = first_nonempty(&[&raw.payload])
        .map(sanitize_text)
        .unwrap_or_else(|| "-".to_string());

    let kind = first_nonempty(&[&raw.kind, &raw.vulnerability_type])
        .map(sanitize_text)
        .unwrap_or_else(|| category.default_kind().to_string());

    let detail = first_nonempty(&[&raw.details, &raw.message])
        .map(sanitize_text)
        .unwrap_or_else(|| category.default_detail().to_string());

    NormalizedFinding {
        category,
        url,
        parameter,
        payload,
        severity: resolve_severity(raw.severity.as_deref(), category),
        kind,
        detail,
    }
}

/// Normalize every raw finding in a category-keyed result set, in category
/// priority order (SQLi, XSS, CSRF) preserving each list's ordering.
pub fn normalize_all(set: &crate::client::models::VulnerabilitySet) -> Vec<NormalizedFinding> {
    let mut findings = Vec::with_capacity(set.sqli.len() + set.xss.len() + set.csrf.len());
    findings.extend(set.sqli.iter().map(|raw| normalize(raw, Category::Sqli)));
    findings.extend(set.xss.iter().map(|raw| normalize(raw, Category::Xss)));
    findings.extend(set.csrf.iter().map(|raw| normalize(raw, Category::Csrf)));
    findings
}

/// Case-insensitive substring scan in severity priority order, falling
/// back to the category default when nothing matches.
fn resolve_severity(raw: Option<&str>, category: Category) -> Severity {
    let lower = raw.unwrap_or_default().to_lowercase();
    if lower.contains("critical") {
        Severity::Critical
    } else if lower.contains("high") {
        Severity::High
    } else if lower.contains("medium") {
        Severity::Medium
    } else if lower.contains("low") {
        Severity::Low
    } else {
        category.default_severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[(&str, &str)]) -> RawFinding {
        let mut finding = RawFinding::default();
        for (key, value) in fields {
            let value = Some(value.to_string());
            match *key {
                "parameter" => finding.parameter = value,
                "param" => finding.param = value,
                "formName" => finding.form_name = value,
                "component" => finding.component = value,
                "payload" => finding.payload = value,
                "type" => finding.kind = value,
                "vulnerability_type" => finding.vulnerability_type = value,
                "severity" => finding.severity = value,
                "url" => finding.url = value,
                "details" => finding.details = value,
                "message" => finding.message = value,
                other => panic!("unknown field {}", other),
            }
        }
        finding
    }

    #[test]
    fn parameter_wins_over_param() {
        let f = normalize(&raw(&[("parameter", "id"), ("param", "q")]), Category::Sqli);
        assert_eq!(f.parameter, "id");
    }

    #[test]
    fn form_name_used_only_without_parameter_fields() {
        let f = normalize(&raw(&[("formName", "login")]), Category::Csrf);
        assert_eq!(f.parameter, "login");

        let f = normalize(
            &raw(&[("param", "token"), ("formName", "login")]),
            Category::Csrf,
        );
        assert_eq!(f.parameter, "token");
    }

    #[test]
    fn component_is_form_name_fallback() {
        let f = normalize(&raw(&[("component", "signup-form")]), Category::Csrf);
        assert_eq!(f.parameter, "signup-form");
    }

    #[test]
    fn empty_fields_do_not_shadow_later_candidates() {
        let f = normalize(&raw(&[("parameter", "  "), ("param", "q")]), Category::Xss);
        assert_eq!(f.parameter, "q");
    }

    #[test]
    fn type_wins_over_vulnerability_type() {
        let f = normalize(
            &raw(&[("type", "stored"), ("vulnerability_type", "reflected")]),
            Category::Xss,
        );
        assert_eq!(f.kind, "stored");
        assert_eq!(f.xss_kind(), "Stored XSS");
    }

    #[test]
    fn severity_substring_priority() {
        let f = normalize(&raw(&[("severity", "HIGH-to-critical")]), Category::Csrf);
        assert_eq!(f.severity, Severity::Critical);

        let f = normalize(&raw(&[("severity", "somewhat low")]), Category::Sqli);
        assert_eq!(f.severity, Severity::Low);
    }

    #[test]
    fn category_default_severity_when_unrecognized() {
        assert_eq!(
            normalize(&raw(&[]), Category::Sqli).severity,
            Severity::Critical
        );
        assert_eq!(normalize(&raw(&[]), Category::Xss).severity, Severity::High);
        assert_eq!(
            normalize(&raw(&[("severity", "weird")]), Category::Csrf).severity,
            Severity::Medium
        );
    }

    #[test]
    fn text_is_sanitized_to_printable_ascii() {
        let f = normalize(
            &raw(&[("payload", " <script>\u{1F600}alert(1)</script>\t")]),
            Category::Xss,
        );
        assert_eq!(f.payload, "<script>alert(1)</script>");
    }

    #[test]
    fn missing_fields_become_placeholders_and_defaults() {
        let f = normalize(&raw(&[]), Category::Csrf);
        assert_eq!(f.url, "-");
        assert_eq!(f.parameter, "-");
        assert_eq!(f.payload, "-");
        assert_eq!(f.kind, Category::Csrf.default_kind());
        assert_eq!(f.detail, Category::Csrf.default_detail());
    }

    #[test]
    fn normalization_is_idempotent() {
        let record = raw(&[
            ("parameter", "id"),
            ("severity", "Medium"),
            ("url", "https://example.com/items"),
            ("details", "boolean blind"),
        ]);
        let a = normalize(&record, Category::Sqli);
        let b = normalize(&record, Category::Sqli);
        assert_eq!(a, b);
    }

    #[test]
    fn report_ids_are_zero_padded() {
        let f = normalize(&raw(&[]), Category::Sqli);
        assert_eq!(f.report_id(0), "SQLI-001");
        assert_eq!(f.report_id(11), "SQLI-012");
    }
}
