//! Logging bootstrap

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter
pub const LOG_ENV: &str = "BINDERY_LOG";

/// Install a fmt subscriber filtered by `BINDERY_LOG`, else `filter`
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
