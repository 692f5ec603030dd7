//! Tracing setup shared by the binaries.
//!
//! The level comes from `RUST_LOG` (default `info`). The terminal game owns
//! stdout in raw mode, so it logs to a file or not at all; the simulator logs
//! to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Append plain-text logs to `path`.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}

/// Log to stderr.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))
}

/// Log to the file named by `MATCH3_LOG_PATH`; no-op when unset.
pub fn init_from_env() -> Result<()> {
    match std::env::var("MATCH3_LOG_PATH") {
        Ok(path) if !path.trim().is_empty() => init_file(Path::new(path.trim())),
        _ => Ok(()),
    }
}
