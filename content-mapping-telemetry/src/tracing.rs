use std::sync::Once;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable that enables log output in tests.
const ENABLE_TRACING_ENV_NAME: &str = "ENABLE_TRACING";

/// Environment variable that switches production logs to JSON lines.
const LOG_FORMAT_ENV_NAME: &str = "APP_LOG_FORMAT";

/// Ensures test tracing is installed at most once per process.
static INIT_TEST_TRACING: Once = Once::new();

/// Errors raised while installing the global tracing subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// Bridging `log` records into `tracing` failed.
    #[error("failed to install the log tracer: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),

    /// A global subscriber was already installed.
    #[error("failed to install the tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Keeps the background log writer alive.
///
/// Buffered log lines are flushed when this value is dropped, so binaries hold it until exit.
#[must_use = "dropping the flusher stops the background log writer"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs the global tracing subscriber for a binary.
///
/// Log lines are written to stdout through a non-blocking writer. The filter defaults to
/// `info` for the application and can be overridden with `RUST_LOG`. Setting
/// `APP_LOG_FORMAT=json` emits JSON lines instead of the human-readable format.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    LogTracer::init()?;

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}=info", app_name.replace('-', "_"))));

    let json = std::env::var(LOG_FORMAT_ENV_NAME).is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(writer)),
        )?;
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_writer(writer)))?;
    }

    tracing::info!(app_name, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a test-friendly subscriber when `ENABLE_TRACING` is set.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var(ENABLE_TRACING_ENV_NAME).is_err() {
            return;
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        // Another test harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
