//! Review Notifier CLI
//!
//! Command-line interface for the homework review status watcher.

use std::path::{Path, PathBuf};

use clap::Parser;
use review_notifier::{load_config, Config, ServiceBuilder};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "review-notifier")]
#[command(about = "Homework review status watcher with Telegram notifications")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unix timestamp to start polling from (overrides config file)
    #[arg(long)]
    from_date: Option<i64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Also write rotated log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Number of rotated log files kept in `--log-dir`
const MAX_LOG_FILES: usize = 5;

fn init_logging(
    level: Level,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("review-notifier")
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _log_guard = init_logging(args.log_level, args.log_dir.as_deref())?;

    tracing::debug!(
        "Parsed command line arguments: config={:?}, from_date={:?}, log_level={:?}, log_dir={:?}",
        args.config,
        args.from_date,
        args.log_level,
        args.log_dir
    );

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => return Err(e.into()),
    }

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(from_date) = args.from_date {
        config.polling.from_date = Some(from_date);
    }

    config.resolve_secrets()?;

    tracing::info!("Starting review notifier");
    tracing::debug!("Status endpoint: {}", config.api.endpoint);

    ServiceBuilder::new(config).build().await?.start().await?;

    Ok(())
}
