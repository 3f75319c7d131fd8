use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tollgate::config::TollgateConfig;
use tollgate::demo;
use tollgate::ratelimit::TokenBucket;

/// Drive a token bucket with a fixed series of requests.
#[derive(Debug, Parser)]
#[command(name = "tollgate", version, about)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tokens added per second
    #[arg(long)]
    rate: Option<f64>,

    /// Maximum tokens the bucket holds
    #[arg(long)]
    capacity: Option<f64>,

    /// Number of requests to issue
    #[arg(long)]
    requests: Option<u32>,

    /// Milliseconds between requests
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut TollgateConfig) {
        if let Some(rate) = self.rate {
            config.bucket.rate = rate;
        }
        if let Some(capacity) = self.capacity {
            config.bucket.capacity = capacity;
        }
        if let Some(requests) = self.requests {
            config.demo.requests = requests;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.demo.interval_ms = interval_ms;
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    info!("Starting Tollgate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config =
        TollgateConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    info!(
        rate = config.bucket.rate,
        capacity = config.bucket.capacity,
        requests = config.demo.requests,
        interval_ms = config.demo.interval_ms,
        "Configuration loaded"
    );

    let bucket = TokenBucket::from_config(&config.bucket)?;

    let report = demo::run(&bucket, &config.demo, shutdown_signal()).await;
    info!(
        allowed = report.allowed,
        denied = report.denied,
        "Demonstration finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
