use console::style;
use tracing::info;

use crate::cli::commands::StopArgs;
use crate::client::{HttpScanService, ScanService};
use crate::errors::WebscanError;

pub async fn handle_stop(args: StopArgs) -> Result<(), WebscanError> {
    info!(scan_id = %args.scan_id, "Requesting scan stop");

    let service = HttpScanService::new(&args.api);
    let response = service.stop_scan(&args.scan_id).await?;

    if response.success {
        println!("{} {}", style("Stopped:").green().bold(), args.scan_id);
    } else {
        println!(
            "Stop request acknowledged with status {}",
            response.status.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}
