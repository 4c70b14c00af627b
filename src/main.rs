use clap::Parser;
use tracing_subscriber::EnvFilter;

use webscan::cli::{self, Cli, Commands};
use webscan::errors::WebscanError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        Commands::Scan(args) => cli::scan::handle_scan(args).await,
        Commands::Report(args) => cli::report::handle_report(args).await,
        Commands::History(args) => cli::history::handle_history(args).await,
        Commands::Compare(args) => cli::compare::handle_compare(args).await,
        Commands::Stop(args) => cli::stop::handle_stop(args).await,
        Commands::Profiles => cli::profiles::handle_profiles().await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                WebscanError::Config(_) => 2,
                WebscanError::InvalidTarget(_) => 3,
                WebscanError::Submission(_) => 4,
                WebscanError::PollTransport(_) | WebscanError::Network(_) => 5,
                WebscanError::Rendering(_) | WebscanError::Pdf(_) => 6,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
