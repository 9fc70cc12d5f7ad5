//! Diagnostic logging to a file.
//!
//! The terminal belongs to the UI, so tracing output goes to the log file
//! configured in `Config::log_file`.

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Install the global tracing subscriber.
///
/// # Details
/// `RUST_LOG` takes precedence over `Config::log_level`.
pub fn init(config: &Config) -> Result<()> {
    let log_path = config.log_file_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(path = %log_path.display(), "logging initialized");
    Ok(())
}
