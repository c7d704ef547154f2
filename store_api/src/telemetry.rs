//! Logging initialization.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::settings::LoggingConfig;

/// Build the level filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?)
}

/// Install the global subscriber according to `config`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;

    match config.format.as_str() {
        "json" => {
            let subscriber = Registry::default().with(filter).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.enable_target)
                    .with_thread_ids(config.enable_thread_ids),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        _ => {
            let subscriber = Registry::default().with(filter).with(
                tracing_subscriber::fmt::layer()
                    .with_target(config.enable_target)
                    .with_thread_ids(config.enable_thread_ids),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    tracing::info!("Logging initialized ({} format)", config.format);
    Ok(())
}
