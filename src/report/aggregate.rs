use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::finding::{Category, NormalizedFinding, Severity};

/// Aggregates computed once per result set and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAggregate {
    pub counts_by_category: HashMap<Category, usize>,
    pub counts_by_severity: HashMap<Severity, usize>,
    pub total_findings: usize,
    pub total_urls_scanned: usize,
    pub overall_risk: Severity,
    pub highest_severity_by_category: HashMap<Category, Severity>,
}

impl ReportAggregate {
    pub fn compute(findings: &[NormalizedFinding], total_urls_scanned: usize) -> Self {
        let mut counts_by_category: HashMap<Category, usize> =
            Category::ORDERED.iter().map(|c| (*c, 0)).collect();
        let mut counts_by_severity: HashMap<Severity, usize> =
            Severity::ORDERED.iter().map(|s| (*s, 0)).collect();

        for finding in findings {
            *counts_by_category.entry(finding.category).or_insert(0) += 1;
            *counts_by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        let overall_risk = Severity::ORDERED
            .iter()
            .copied()
            .find(|s| counts_by_severity.get(s).copied().unwrap_or(0) > 0)
            .unwrap_or(Severity::Low);

        let highest_severity_by_category = Category::ORDERED
            .iter()
            .map(|category| {
                let highest = findings
                    .iter()
                    .filter(|f| f.category == *category)
                    .map(|f| f.severity)
                    .min_by_key(|s| s.rank())
                    .unwrap_or(Severity::Low);
                (*category, highest)
            })
            .collect();

        Self {
            counts_by_category,
            counts_by_severity,
            total_findings: findings.len(),
            total_urls_scanned,
            overall_risk,
            highest_severity_by_category,
        }
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.counts_by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn severity_count(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn highest_severity(&self, category: Category) -> Severity {
        self.highest_severity_by_category
            .get(&category)
            .copied()
            .unwrap_or(Severity::Low)
    }

    /// Share of findings in a category, rounded to whole percent. Defined
    /// as 0 for an empty result set.
    pub fn category_percent(&self, category: Category) -> u32 {
        if self.total_findings == 0 {
            return 0;
        }
        let count = self.category_count(category) as f64;
        (count / self.total_findings as f64 * 100.0).round() as u32
    }

    /// Overall posture statement for the executive summary, keyed by risk.
    pub fn posture_statement(&self) -> &'static str {
        match self.overall_risk {
            Severity::Critical => {
                "Security posture is weak. Immediate remediation is required due to critical exposure."
            }
            Severity::High => {
                "Security posture is moderate-to-weak. High-risk findings should be prioritized."
            }
            Severity::Medium => {
                "Security posture is moderate. Hardening and validation controls should be improved."
            }
            Severity::Low => {
                "Security posture is relatively stable based on current scan output."
            }
        }
    }
}
