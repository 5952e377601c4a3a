//! modpub command line entry point.

mod app;
mod cli;
mod config;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Commands};
use crate::config::{Config, FileConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Commands::Upload(args) = cli.command else {
        println!("modpub {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    // Load configuration.
    let file = FileConfig::load(cli.global.config.as_deref())?;
    let config = Config::resolve(&cli.global, file);

    init_logging(&config)?;
    tracing::debug!(endpoint = %config.api.endpoint(), "configuration loaded");

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::upload(config.api, args))
}

/// Installs the tracing subscriber. `RUST_LOG` overrides `--log`.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log)
            .with_context(|| format!("invalid log level: {}", config.log))?,
    };

    let console = (!config.quiet).then(|| fmt::layer().with_writer(std::io::stderr));

    let file = match &config.log_file {
        Some(path) => {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(f)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Ok(())
}
