//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console output and optional file output
//! - Configuration file based log level control, overridable with `RUST_LOG`
//! - Structured JSON file logging (optional)
//! - Rotation of the previous log file on startup
//! - Local-time timestamps

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Subscriber, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking file writer alive for the life of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Local time with milliseconds and UTC offset
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Name the previous log file is moved to, stamped with its last write time
pub fn rotated_file_name(file_name: &str, written_at: DateTime<Local>) -> String {
    let stem = file_name.strip_suffix(".log").unwrap_or(file_name);
    format!("{}.{}.log", stem, written_at.format("%Y%m%dT%H%M%S"))
}

/// Move an existing log file aside so each run starts a fresh one
fn rotate_existing_log_file(log_dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let log_file_path = log_dir.join(file_name);
    if !log_file_path.exists() {
        return Ok(None);
    }

    let metadata = std::fs::metadata(&log_file_path)
        .with_context(|| format!("Failed to read metadata of {}", log_file_path.display()))?;
    let file_time = metadata
        .modified()
        .or_else(|_| metadata.created())
        .unwrap_or_else(|_| std::time::SystemTime::now());

    let rotated_path = log_dir.join(rotated_file_name(file_name, file_time.into()));
    std::fs::rename(&log_file_path, &rotated_path).with_context(|| {
        format!(
            "Failed to rotate log file {} to {}",
            log_file_path.display(),
            rotated_path.display()
        )
    })?;

    Ok(Some(rotated_path))
}

/// Filter from `RUST_LOG`, else the configured level with noisy HTTP
/// dependencies held at `info`/`warn` unless tracing everything
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for directive in ["reqwest=info", "hyper=warn", "h2=warn", "html5ever=warn"] {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    Ok(filter)
}

/// Console layer for whichever subscriber stack it ends up on
fn console_layer<S>(config: &LoggingConfig) -> Option<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    })
}

/// Initialize logging with custom configuration
///
/// Can only succeed once per process; later calls return an error from the
/// subscriber registry.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(config)?;
    let registry = Registry::default().with(env_filter);

    let mut rotated = None;
    if config.file_output {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!("Failed to create log directory {}", config.log_dir.display())
        })?;
        rotated = rotate_existing_log_file(&config.log_dir, &config.file_name)?;

        let file_appender = rolling::never(&config.log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        if config.json_format {
            let file_layer = fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            registry
                .with(file_layer)
                .with(console_layer(config))
                .try_init()?;
        } else {
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(LocalTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            registry
                .with(file_layer)
                .with(console_layer(config))
                .try_init()?;
        }
    } else {
        registry.with(console_layer(config)).try_init()?;
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!(
            "Log file: {}",
            config.log_dir.join(&config.file_name).display()
        );
    }
    if let Some(path) = rotated {
        info!("Rotated previous log file to {}", path.display());
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("listing-scraper {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_output);
        assert!(!config.file_output);
    }

    #[test]
    fn rotated_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        assert_eq!(
            rotated_file_name("listing-scraper.log", at),
            "listing-scraper.20240309T140507.log"
        );
        assert_eq!(rotated_file_name("plain", at), "plain.20240309T140507.log");
    }

    #[test]
    fn rotation_moves_existing_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run.log"), "old run\n").unwrap();

        let rotated = rotate_existing_log_file(dir.path(), "run.log").unwrap().unwrap();

        assert!(!dir.path().join("run.log").exists());
        assert_eq!(std::fs::read_to_string(rotated).unwrap(), "old run\n");
        assert_eq!(rotate_existing_log_file(dir.path(), "run.log").unwrap(), None);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "listing_scraper_lib=notalevel".to_string(),
            ..LoggingConfig::default()
        };

        // RUST_LOG would take precedence over the configured level
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_env_filter(&config).is_err());
        }
    }
}
