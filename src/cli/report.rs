use std::path::{Path, PathBuf};

use console::style;
use tracing::info;

use crate::cli::commands::ReportArgs;
use crate::cli::scan::write_artifacts;
use crate::client::models::ScanResultPayload;
use crate::document::ScanReport;
use crate::errors::WebscanError;

/// Rebuild the PDF and CSV from a saved result.json without touching the
/// scanner service.
pub async fn handle_report(args: ReportArgs) -> Result<(), WebscanError> {
    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(WebscanError::Config(format!(
            "Result file not found: {}",
            input.display()
        )));
    }

    info!(input = %input.display(), "Re-rendering report");

    let content = tokio::fs::read_to_string(input).await?;
    let payload: ScanResultPayload = serde_json::from_str(&content)?;
    let report = ScanReport::from_payload(&payload);

    let output_dir = PathBuf::from(&args.output);
    write_artifacts(&output_dir, &payload, &report).await?;

    println!(
        "{} {} findings, reports written to {}",
        style("Rendered:").green().bold(),
        report.aggregate.total_findings,
        output_dir.display()
    );
    Ok(())
}
