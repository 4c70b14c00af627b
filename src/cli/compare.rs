use std::collections::HashMap;

use console::style;
use tracing::info;

use crate::cli::commands::CompareArgs;
use crate::client::models::RawFinding;
use crate::client::{HttpScanService, ScanService};
use crate::errors::WebscanError;

pub async fn handle_compare(args: CompareArgs) -> Result<(), WebscanError> {
    info!(url = %args.url, "Comparing scans");

    let service = HttpScanService::new(&args.api);
    let response = service
        .compare_scans(&args.url, args.scan_a, args.scan_b)
        .await?;

    if args.json {
        let body = serde_json::json!({
            "url": response.url,
            "improvements": response.comparison.improvements,
            "regressions": response.comparison.regressions,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Comparison for {}", style(&response.url).cyan());
    print_delta(
        &style("Fixed since previous scan").green().to_string(),
        &response.comparison.improvements,
    );
    print_delta(
        &style("New since previous scan").red().to_string(),
        &response.comparison.regressions,
    );
    Ok(())
}

fn print_delta(heading: &str, findings: &HashMap<String, Vec<RawFinding>>) {
    let total: usize = findings.values().map(Vec::len).sum();
    println!("{} ({})", heading, total);
    for (category, entries) in findings {
        for finding in entries {
            let location = finding
                .url
                .as_deref()
                .or(finding.parameter.as_deref())
                .or(finding.param.as_deref())
                .unwrap_or("-");
            println!("  [{}] {}", category.to_uppercase(), location);
        }
    }
}
