//! Process entry point for mediadrop
//!
//! Loads the configuration, installs the log subscriber and runs the daemon
//! until the directory watch fails.

use clap::Parser;
use mediadrop::config::{LogFormat, LoggingConfig};
use mediadrop::{Config, Daemon};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// mediadrop - move arriving media into a library and fetch its subtitles
#[derive(Parser, Debug)]
#[command(name = "mediadrop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "mediadrop.toml")]
    config: PathBuf,
}

/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    info!(config = %args.config.display(), "configuration loaded");

    let daemon = match Daemon::from_config(&config) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "failed to initialize daemon");
            return ExitCode::FAILURE;
        }
    };

    match daemon.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon stopped");
            ExitCode::FAILURE
        }
    }
}
