//! Subscriber setup for hosts that embed the engine.
//!
//! The library only emits events. A host calls [`init`] once at startup with
//! [`LogSettings::from_env`]. Events worth filtering on:
//!
//! - `tm_matching::matching::pipeline`: `match_search_completed` (info) and
//!   `prefetch_ceiling_truncated_candidates` (warn)
//! - `tm_matching::matching::experience`: `fine_filter_rejected` (debug)
//! - `tm_matching::db::util`: `slow_query_detected` (warn)

use std::{io, path::PathBuf};

use thiserror::Error;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, filter::ParseError};

/// Engine events at info, everything else at warn.
pub const DEFAULT_DIRECTIVES: &str = "warn,tm_matching=info";

const FINE_FILTER_DIRECTIVE: &str = "tm_matching::matching::experience=debug";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter directives: {0}")]
    InvalidDirectives(#[from] ParseError),
    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open rolling log file: {0}")]
    Appender(#[from] InitError),
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Prefix of the rolling log file.
    pub app_name: String,
    pub directives: String,
    /// Daily rolling file output instead of stdout.
    pub log_dir: Option<PathBuf>,
    /// Log every profile the fine filter rejects, with the failing skill.
    pub trace_fine_filter: bool,
}

impl LogSettings {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            directives: DEFAULT_DIRECTIVES.to_string(),
            log_dir: None,
            trace_fine_filter: false,
        }
    }

    /// `RUST_LOG`, `TM_LOG_DIR` and `TM_LOG_FINE_FILTER` (`1` / `true`).
    pub fn from_env(app_name: impl Into<String>) -> Self {
        let mut settings = Self::new(app_name);

        if let Some(directives) = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            settings.directives = directives;
        }
        settings.log_dir = std::env::var_os("TM_LOG_DIR")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        settings.trace_fine_filter = std::env::var("TM_LOG_FINE_FILTER")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        settings
    }

    pub fn directive_string(&self) -> String {
        if self.trace_fine_filter {
            format!("{},{FINE_FILTER_DIRECTIVE}", self.directives)
        } else {
            self.directives.clone()
        }
    }

    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        Ok(EnvFilter::try_new(self.directive_string())?)
    }
}

/// Install the global subscriber. With a log directory the returned guard
/// must be held for as long as events should reach the file.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>, LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter()?)
        .with_target(true);

    let Some(dir) = &settings.log_dir else {
        builder
            .try_init()
            .map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
        path: dir.clone(),
        source,
    })?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(settings.app_name.as_str())
        .filename_suffix("log")
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    builder
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;
    Ok(Some(guard))
}

/// Test-writer subscriber with fine-filter rejections visible. Later calls are no-ops.
pub fn init_for_tests() {
    let settings = LogSettings {
        directives: "warn,tm_matching=debug".to_string(),
        trace_fine_filter: true,
        ..LogSettings::new("tm-matching-test")
    };

    if let Ok(filter) = settings.env_filter() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}
