use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cli::commands::ScanArgs;
use crate::client::{HttpScanService, DEFAULT_API_BASE};
use crate::config::{parse_config, Profile, ScanOptions, WebscanConfig};
use crate::document::{render_pdf, PageGeometry, ScanReport};
use crate::errors::WebscanError;
use crate::report::export::to_csv;
use crate::session::{SessionStatus, SessionTracker};

pub async fn handle_scan(args: ScanArgs) -> Result<(), WebscanError> {
    if !args.target.starts_with("http://") && !args.target.starts_with("https://") {
        return Err(WebscanError::InvalidTarget(format!(
            "target must be an http(s) URL, got '{}'",
            args.target
        )));
    }

    let file_config = match &args.config {
        Some(path) => parse_config(Path::new(path)).await?,
        None => WebscanConfig::default(),
    };

    let options = resolve_options(&args, &file_config)?;
    let request = options.to_request();

    let api_base = args
        .api
        .clone()
        .or_else(|| file_config.api.as_ref().and_then(|a| a.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let interval = args
        .interval
        .or_else(|| file_config.api.as_ref().and_then(|a| a.poll_interval_secs))
        .unwrap_or(1)
        .max(1);

    let output_dir = resolve_output_dir(&args, &file_config);

    info!(target = %options.target, profile = %options.profile, api = %api_base, "Starting scan");

    let service = Arc::new(HttpScanService::new(&api_base));
    let mut tracker = SessionTracker::new(service, Duration::from_secs(interval));

    let scan_id = tracker.submit(&request, options.total_unit()).await?;
    println!("Scan started: {}", style(&scan_id).cyan());

    let bar = ProgressBar::new(options.total_unit() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:30.cyan/dark_gray} {pos}/{len} | {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    bar.set_message("Waiting for scanner...");

    let session = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                bar.set_message("Canceling...");
                tracker.cancel().await?;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }

        if let Some(session) = tracker.session().await {
            bar.set_length(session.progress.total_unit.max(1) as u64);
            bar.set_position(session.progress.current_unit as u64);
            let counts = session.live_counts;
            bar.set_message(format!(
                "{} | SQLi {} XSS {} CSRF {}",
                session.phase.as_deref().unwrap_or(session.status.label()),
                counts.sqli,
                counts.xss,
                counts.csrf
            ));
            if session.status.is_terminal() {
                break session;
            }
        }
    };
    bar.finish_and_clear();

    match session.status {
        SessionStatus::Completed => {
            let payload = session.result.ok_or_else(|| {
                WebscanError::Internal("completed scan carried no result payload".into())
            })?;
            let report = ScanReport::from_payload(&payload);
            write_artifacts(&output_dir, &payload, &report).await?;

            println!(
                "{} {} findings, overall risk {}",
                style("Scan complete:").green().bold(),
                report.aggregate.total_findings,
                style(report.aggregate.overall_risk.label()).bold()
            );
            println!("Reports written to {}", output_dir.display());
            Ok(())
        }
        SessionStatus::Canceled => {
            println!("{}", style("Scan canceled").yellow());
            std::process::exit(130);
        }
        SessionStatus::Error => Err(WebscanError::Internal(
            session
                .message
                .unwrap_or_else(|| "scan failed without a message".to_string()),
        )),
        other => Err(WebscanError::Internal(format!(
            "scan ended in non-terminal state {}",
            other.label()
        ))),
    }
}

/// Output directory precedence: --output flag, then the config file's
/// output.directory, then ./results.
fn resolve_output_dir(args: &ScanArgs, file: &WebscanConfig) -> PathBuf {
    args.output
        .clone()
        .or_else(|| file.output.as_ref().and_then(|o| o.directory.clone()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./results"))
}

fn resolve_options(args: &ScanArgs, file: &WebscanConfig) -> Result<ScanOptions, WebscanError> {
    let file_scan = file.scan.clone().unwrap_or_default();

    let profile = match &args.profile {
        Some(name) => name.parse::<Profile>().map_err(WebscanError::Config)?,
        None => file_scan.profile.unwrap_or_default(),
    };

    let mut options = ScanOptions::new(args.target.clone(), profile);
    options.max_urls = args.max_urls.or(file_scan.max_urls);
    options.depth_limit = args.depth.or(file_scan.depth_limit);
    options.timeout = args.timeout.or(file_scan.timeout);
    if args.no_sqli || file_scan.sqli == Some(false) {
        options.sqli = false;
    }
    if args.no_xss || file_scan.xss == Some(false) {
        options.xss = false;
    }
    if args.no_csrf || file_scan.csrf == Some(false) {
        options.csrf = false;
    }
    options.verbose = file_scan.verbose.unwrap_or(false);

    if !options.sqli && !options.xss && !options.csrf {
        return Err(WebscanError::Config(
            "All detection modules are disabled; nothing to scan".into(),
        ));
    }

    Ok(options)
}

/// Write report.pdf, report.csv and result.json into the output directory.
pub async fn write_artifacts(
    dir: &Path,
    payload: &crate::client::models::ScanResultPayload,
    report: &ScanReport,
) -> Result<(), WebscanError> {
    tokio::fs::create_dir_all(dir).await?;

    let pdf_bytes = render_pdf(report, PageGeometry::A4)?;
    tokio::fs::write(dir.join("report.pdf"), pdf_bytes).await?;

    let csv = to_csv(&report.findings);
    tokio::fs::write(dir.join("report.csv"), csv).await?;

    let json = serde_json::to_vec_pretty(payload)?;
    tokio::fs::write(dir.join("result.json"), json).await?;

    Ok(())
}
