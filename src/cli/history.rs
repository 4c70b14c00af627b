use console::style;
use tracing::info;

use crate::cli::commands::HistoryArgs;
use crate::client::{HttpScanService, ScanService};
use crate::errors::WebscanError;

pub async fn handle_history(args: HistoryArgs) -> Result<(), WebscanError> {
    info!(url = %args.url, "Fetching scan history");

    let service = HttpScanService::new(&args.api);
    let response = service.fetch_history(&args.url).await?;

    if args.json {
        let entries = serde_json::to_string_pretty(&response.history)?;
        println!("{}", entries);
        return Ok(());
    }

    println!(
        "{} scans recorded for {}",
        response.total_scans,
        style(&response.url).cyan()
    );
    for (index, entry) in response.history.iter().enumerate() {
        let timestamp = entry.timestamp.as_deref().unwrap_or("-");
        let mut counts: Vec<String> = entry
            .summary
            .iter()
            .map(|(category, count)| format!("{}: {}", category, count))
            .collect();
        counts.sort();
        println!("  #{:<3} {:<24} {}", index + 1, timestamp, counts.join("  "));
    }
    Ok(())
}
