use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_API_BASE;

fn long_version() -> String {
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let build_ts = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");
    format!("{} ({}, built {})", env!("CARGO_PKG_VERSION"), git_hash, build_ts)
}

#[derive(Parser)]
#[command(name = "webscan", version = long_version(), about = "Web vulnerability scanner client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scan and generate a report
    Scan(ScanArgs),
    /// Re-render a report from a saved result file
    Report(ReportArgs),
    /// Show past scans for a target
    History(HistoryArgs),
    /// Compare the two most recent scans of a target
    Compare(CompareArgs),
    /// Stop a running scan by id
    Stop(StopArgs),
    /// List scan profile presets
    Profiles,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Target web application URL
    #[arg(short, long)]
    pub target: String,

    /// Scan profile: quick, standard, full, aggressive [default: standard]
    #[arg(short, long)]
    pub profile: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for report artifacts [default: ./results]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Scanner API base URL [default: http://localhost:5000]
    #[arg(long)]
    pub api: Option<String>,

    /// Status poll interval in seconds [default: 1]
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override the profile's crawl URL limit
    #[arg(long)]
    pub max_urls: Option<u32>,

    /// Override the profile's crawl depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Override the profile's request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Skip SQL injection checks
    #[arg(long)]
    pub no_sqli: bool,

    /// Skip cross-site scripting checks
    #[arg(long)]
    pub no_xss: bool,

    /// Skip CSRF checks
    #[arg(long)]
    pub no_csrf: bool,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Saved result.json from a previous scan
    #[arg(short, long)]
    pub input: String,

    /// Output directory for report artifacts
    #[arg(short, long, default_value = "./results")]
    pub output: String,
}

#[derive(Args, Clone)]
pub struct HistoryArgs {
    /// Target URL to look up
    #[arg(short, long)]
    pub url: String,

    /// Scanner API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct CompareArgs {
    /// Target URL to compare scans for
    #[arg(short, long)]
    pub url: String,

    /// Earlier scan index (defaults to second newest)
    #[arg(long)]
    pub scan_a: Option<usize>,

    /// Later scan index (defaults to newest)
    #[arg(long)]
    pub scan_b: Option<usize>,

    /// Scanner API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct StopArgs {
    /// Scan ID to stop
    pub scan_id: String,

    /// Scanner API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api: String,
}
