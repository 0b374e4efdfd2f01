//! Feedcast relay entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Feedcast - RSS to Telegram relay
#[derive(Parser, Debug)]
#[command(name = "feedcast")]
#[command(version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yml", env = "FEEDCAST_CONFIG")]
    config: PathBuf,

    /// Enable verbose output (--verbose, --verbose --verbose)
    #[arg(long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "feedcast_api=info,feedcast_telegram=info,feedcast_core=info,feedcast_persistence=info",
            1 => "feedcast_api=debug,feedcast_telegram=debug,feedcast_core=debug,feedcast_persistence=debug,tower_http=debug",
            _ => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    fmt().with_env_filter(filter).with_target(false).init();

    match feedcast_api::run(&cli.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Relay stopped");
            ExitCode::FAILURE
        }
    }
}
