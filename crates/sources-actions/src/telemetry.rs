//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ConfigError, LogConfig, LogFormat};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `log.filter`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(log: &LogConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .map_err(|e| ConfigError::Validation(format!("invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match log.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    result.map_err(|e| ConfigError::Validation(format!("tracing already initialized: {}", e)))
}
