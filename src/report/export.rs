use super::finding::NormalizedFinding;

/// Line-oriented tabular export of the normalized findings, one row per
/// finding, for spreadsheet consumption. Mirrors the columns of the PDF
/// category tables.
pub fn to_csv(findings: &[NormalizedFinding]) -> String {
    let mut csv = String::from("Type,Severity,URL,Parameter,Payload,Detection Type\n");

    for finding in findings {
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"\n",
            finding.category.display_name(),
            finding.severity,
            escape(&finding.url),
            escape(&finding.parameter),
            escape(&finding.payload),
            escape(&finding.kind),
        ));
    }

    csv
}

fn escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::RawFinding;
    use crate::report::finding::{normalize, Category};

    #[test]
    fn one_row_per_finding_with_header() {
        let findings = vec![
            normalize(
                &RawFinding {
                    parameter: Some("id".into()),
                    url: Some("https://example.com/item".into()),
                    payload: Some("' OR 1=1--".into()),
                    ..Default::default()
                },
                Category::Sqli,
            ),
            normalize(&RawFinding::default(), Category::Csrf),
        ];

        let csv = to_csv(&findings);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Type,Severity,URL,Parameter,Payload,Detection Type");
        assert!(lines[1].starts_with("\"SQL Injection\",\"Critical\""));
        assert!(lines[2].starts_with("\"CSRF\",\"Medium\""));
    }

    #[test]
    fn quotes_are_doubled() {
        let findings = vec![normalize(
            &RawFinding {
                payload: Some("\"><script>".into()),
                ..Default::default()
            },
            Category::Xss,
        )];
        let csv = to_csv(&findings);
        assert!(csv.contains("\"\"\"><script>\""));
    }
}
