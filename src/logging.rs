//! Log to a file in the cache directory; the terminal belongs to the UI.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cache::CacheManager;
use crate::config::LoggingConfig;

/// Filter for the log file: `RUST_LOG` when set, otherwise `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(
    cache: &CacheManager,
    config: &LoggingConfig,
    level_override: Option<&str>,
) -> Result<WorkerGuard> {
    cache.ensure_cache_dir()?;
    let level = level_override.unwrap_or(&config.level);

    let file_appender = rolling::never(cache.cache_dir(), &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .with_filter(env_filter(level)),
        )
        .try_init()
        .map_err(|e| eyre!("Failed to initialise logging: {}", e))?;

    tracing::info!(level, "logging initialised");
    Ok(guard)
}
