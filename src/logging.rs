//! Tracing setup for the teller binary.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    /// Command-line use: keeps stdout for results
    Stderr,
    /// Interactive screen: the terminal is taken, append to a file instead
    File(PathBuf),
}

/// Install the global subscriber. `filter` uses EnvFilter syntax ("info",
/// "teller_ledger=debug", ...).
pub fn init(filter: &str, sink: LogSink) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    match sink {
        LogSink::Stderr => {
            let layer = fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(env_filter);
            tracing_subscriber::registry().with(layer).try_init()?;
        }
    }

    tracing::debug!(filter, "logging initialized");
    Ok(())
}
