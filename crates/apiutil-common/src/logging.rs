//! Logging sink and the client-facing logger.
//!
//! The client core only ever logs at two levels through [`Logger`]: `info` for
//! request/response traffic and `debug` for handled failures (transport errors,
//! missed token harvests). Every real error still propagates to the caller.
//!
//! [`TracingLogger`] forwards to `tracing`; where those events end up is decided
//! once per process by [`init_logging`] from an explicit [`LogSettings`] value:
//!
//! ```rust,ignore
//! use apiutil_common::logging::{init_logging, LogSettings};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogSettings::from_env())?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: "json" selects JSON output in [`LogSettings::from_env`]
//! - `RUST_LOG`: when set, overrides [`LogSettings::level`]

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Target used for every event emitted by [`TracingLogger`].
pub const LOG_TARGET: &str = "apiutil";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log output: {0}")]
    Io(#[from] io::Error),

    #[error("Logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Two-level logger used by the client core.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Default [`Logger`], forwarding to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: LOG_TARGET, "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: LOG_TARGET, "{}", message);
    }
}

/// Output format of the process-wide sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One flattened JSON object per event
    Json,
}

impl From<&str> for LogFormat {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    /// Drop everything
    Discard,
    /// Append to a file, created if missing
    File(PathBuf),
}

impl LogOutput {
    fn is_terminal(&self) -> bool {
        matches!(self, LogOutput::Stderr | LogOutput::Stdout)
    }

    /// Build the writer factory for this output.
    pub fn make_writer(&self) -> Result<BoxMakeWriter, LoggingError> {
        let writer = match self {
            LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
            LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
            LogOutput::Discard => BoxMakeWriter::new(io::sink),
            LogOutput::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        };
        Ok(writer)
    }
}

/// Process-wide logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Minimum level directive, e.g. "info" or "apiutil=debug"
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
        }
    }
}

impl LogSettings {
    /// Defaults, with the format taken from `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
        Self {
            format: LogFormat::from(log_format.as_str()),
            ..Self::default()
        }
    }

    /// `RUST_LOG` when set, otherwise [`LogSettings::level`].
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber described by `settings`.
///
/// Fails with [`LoggingError::Init`] if a global subscriber is already set.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let env_filter = settings.env_filter();
    let writer = settings.output.make_writer()?;

    match settings.format {
        LogFormat::Json => init_json_logging(env_filter, writer),
        LogFormat::Text => init_text_logging(env_filter, writer, settings.output.is_terminal()),
    }
}

fn init_json_logging(env_filter: EnvFilter, writer: BoxMakeWriter) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(true)
                .flatten_event(true),
        )
        .try_init()?;
    Ok(())
}

fn init_text_logging(
    env_filter: EnvFilter,
    writer: BoxMakeWriter,
    ansi: bool,
) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(ansi),
        )
        .try_init()?;
    Ok(())
}
