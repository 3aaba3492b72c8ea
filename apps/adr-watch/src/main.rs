use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use app::{App, CancellationToken};
use clap::Parser;
use serde::Deserialize;
use stock_data_providers::market_watch::{config::MarketWatchConfig, MarketWatch};
use terminal_reporter::TerminalReporter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use yahoo::{QuoteClient, SourceConfig};

use crate::dashboard::Dashboard;

mod dashboard;

#[derive(Deserialize, Debug, Default, PartialEq)]
struct Config {
    #[serde(default)]
    watch: MarketWatchConfig,
    #[serde(default)]
    source: SourceConfig,
}

#[derive(Parser)]
struct Opts {
    /// YAML file overriding built-in defaults
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let file = File::open(path)
        .with_context(|| format!("Cannot open config file {}", path.display()))?;
    serde_yaml::from_reader(file)
        .with_context(|| format!("Cannot parse config file {}", path.display()))
}

fn init_logging() -> anyhow::Result<()> {
    // stdout belongs to the rendered view
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

#[cfg(unix)]
async fn termination_requested() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            error!(%e, "Cannot listen for SIGTERM");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn termination_requested() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(%e, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

async fn stop_on_signal(shutdown: CancellationToken) {
    termination_requested().await;
    println!("\nMonitoring stopped.");
    shutdown.cancel();
}

async fn runner() -> anyhow::Result<()> {
    let cli_opts = Opts::parse();
    init_logging()?;

    let config = load_config(cli_opts.config_file.as_deref())?;
    let client = QuoteClient::new(config.source).context("Cannot build quote client")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(stop_on_signal(shutdown.clone()));

    let reporter = TerminalReporter::new(config.watch.foreign_market.clone());
    let app = App::build(Dashboard::default())
        .add_producer(MarketWatch::new(client, config.watch))
        .add_consumer(reporter)
        .with_shutdown(shutdown)
        .build();

    info!("Start watching the market");
    app.run().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    runner().await
}
