//! Structured logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! One entry point, [`init`]. Admin subcommands log to stderr only; when a
//! logs directory is supplied (the `link`/`chat` request paths invoked by the
//! site) a JSON file layer with daily rotation is added on top.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Holds the non-blocking writer guard for file logging.
///
/// Must be kept alive for the duration of the process; dropping it flushes
/// pending entries and closes the file. `None` when file logging is off.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

/// Initialise the global tracing subscriber.
///
/// Always emits human-readable output to stderr, filtered by `RUST_LOG`
/// (default: `info`). With `logs_dir` set, additionally writes JSON lines to
/// `{logs_dir}/opendoorz.log.YYYY-MM-DD`, rotated daily.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created.
pub fn init(logs_dir: Option<&Path>) -> anyhow::Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(dir) = logs_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        return Ok(LoggingGuard { _guard: None });
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("failed to create logs directory {}: {e}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(dir, "opendoorz.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(json_layer)
        .init();

    Ok(LoggingGuard {
        _guard: Some(guard),
    })
}
