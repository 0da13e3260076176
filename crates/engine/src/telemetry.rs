// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide log subscriber setup

use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Errors from installing the log subscriber
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("log subscriber already installed: {0}")]
    Init(#[from] TryInitError),
    #[error("log file path has no file name: {}", .0.display())]
    NoFileName(std::path::PathBuf),
    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Filter from `RUST_LOG`, falling back to `default` when it is unset or invalid
pub fn env_filter(default: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default)?),
    }
}

/// Log to stderr
pub fn init(default: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter(default)?)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// Log to `path` through a non-blocking writer
///
/// Logs are flushed when the returned guard is dropped; hold it for the life
/// of the process.
pub fn init_with_file(default: &str, path: &Path) -> Result<WorkerGuard, TelemetryError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| TelemetryError::NoFileName(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(default)?)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
