//! Logging configuration using tracing

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "BOOKING_ADMIN_LOG";

/// Initialize the logging subsystem.
///
/// Logs go to a daily file under `log_dir` so they do not mix with the
/// console menu. The level is controlled by `BOOKING_ADMIN_LOG`, e.g.
/// `BOOKING_ADMIN_LOG=debug`.
pub fn init(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "booking-admin.log");

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("booking_admin=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("booking-admin starting, logs in {}", log_dir.display());
    Ok(())
}

/// Logging to stderr, for the scripted demo
pub fn init_stderr() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("booking_admin=debug,warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
