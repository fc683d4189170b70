// src/logging.rs

use tracing_subscriber::EnvFilter;

use crate::config::RollupConfig;

/// Installs a global fmt subscriber filtered at `level`.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is a
/// no-op; returns whether this call installed the subscriber.
pub fn init_tracing(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}

/// Installs the global subscriber at the configured `log_level`.
pub fn init_from_config(config: &RollupConfig) -> bool { init_tracing(&config.log_level) }
