use crate::error::RenderError;
use crate::exception::failure::ParsingFailure;
use tracing::Level;

/// Sink for the diagnostics the filter records while answering a request
pub trait FailureLogger: Send + Sync + 'static {
    /// Record a caught parsing failure with a human summary
    fn log(&self, level: Level, failure: &ParsingFailure, message: &str);

    /// Record a failure to write the error page
    fn log_render_failure(&self, level: Level, error: &RenderError, message: &str);
}

/// Emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

// tracing needs the level at compile time, hence the match
macro_rules! event_at {
    ($level:expr, $($field:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($field)+),
            Level::WARN => tracing::warn!($($field)+),
            Level::INFO => tracing::info!($($field)+),
            Level::DEBUG => tracing::debug!($($field)+),
            _ => tracing::trace!($($field)+),
        }
    };
}

impl FailureLogger for TracingLogger {
    fn log(&self, level: Level, failure: &ParsingFailure, message: &str) {
        let kind = failure.kind();
        let error = failure.chain();
        event_at!(level, kind = %kind, error = %error, "{}", message);
    }

    fn log_render_failure(&self, level: Level, error: &RenderError, message: &str) {
        event_at!(level, error = %error, "{}", message);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl FailureLogger for NoopLogger {
    fn log(&self, _: Level, _: &ParsingFailure, _: &str) {}

    fn log_render_failure(&self, _: Level, _: &RenderError, _: &str) {}
}
