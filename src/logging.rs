//! Logging setup for image-describer
//!
//! Thin wrapper around `tracing-subscriber` so the binary and embedding
//! applications configure output the same way.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the level passed to [`init_logging`].
pub const LOG_ENV_VAR: &str = "IMAGE_DESCRIBER_LOG";

/// Log levels supported by image-describer.
///
/// These map to the tracing level hierarchy: ERROR, WARN, INFO, DEBUG, TRACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Error logs only
    Error,
    /// Warning and error logs
    Warn,
    /// Normal operational messages (uploads, retrievals, detection failures)
    Info,
    /// Request URLs and response sizes
    Debug,
    /// Everything, including request/response shapes
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }

    /// Default filter directive for this level, scoped to this crate.
    pub fn directive(self) -> String {
        format!("image_describer={}", self.to_tracing_level())
    }
}

/// Initialize logging with a specific log level.
///
/// Call once at the start of the program. If `IMAGE_DESCRIBER_LOG` is set it
/// takes precedence over `level`:
///
/// ```bash
/// IMAGE_DESCRIBER_LOG=debug image-describer
/// ```
///
/// # Examples
///
/// ```no_run
/// use image_describer::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Info);
/// tracing::info!("Application starting");
/// ```
pub fn init_logging(level: LogLevel) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::debug!("Logging initialized at level: {:?}", level);
}
