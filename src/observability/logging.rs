//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (console + rotating file sink)
//! - Provide the audit logger used by the request pipeline
//!
//! # Design Decisions
//! - `RUST_LOG` overrides `logging.level`
//! - The file writer is non-blocking and non-lossy: one worker thread writes
//!   whole lines, so concurrent requests never interleave partial lines
//! - Audit events use a dedicated target so they can be filtered and parsed

use std::fs;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Target for request audit events.
pub const AUDIT_TARGET: &str = "mif_firewall";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory: {0}")]
    Directory(#[from] std::io::Error),

    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("a global subscriber is already installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Audit sink for request decisions.
///
/// Fire-and-forget: implementations swallow their own failures so logging can
/// never change a request's outcome.
pub trait RequestLogger: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
}

/// [`RequestLogger`] emitting tracing events on [`AUDIT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRequestLogger;

impl RequestLogger for TracingRequestLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: AUDIT_TARGET, "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: AUDIT_TARGET, "{}", message);
    }
}

fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit,
/// dropping it flushes the file writer.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(&config.directory)?;

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation(&config.rotation))
        .filename_prefix(config.file_prefix.clone())
        .filename_suffix("log");
    if config.max_files > 0 {
        builder = builder.max_log_files(config.max_files);
    }
    let appender = builder.build(&config.directory)?;
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "inference_firewall={level},{AUDIT_TARGET}={level},tower_http=info,warn",
            level = config.level
        ))
    });

    let console = config.console.then(|| fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_names() {
        assert_eq!(rotation("hourly"), Rotation::HOURLY);
        assert_eq!(rotation("never"), Rotation::NEVER);
        assert_eq!(rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn tracing_logger_without_subscriber_is_a_no_op() {
        let logger = TracingRequestLogger;
        logger.info("Allowed request from IP 127.0.0.1: hello");
        logger.warning("Blocked request from IP 127.0.0.1: reason=x prompt=y");
    }
}
