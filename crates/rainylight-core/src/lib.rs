pub mod config;
pub mod error;

pub use config::{
    ColorPolicy, Config, Credentials, HttpConfig, LightConfig, SwitchBotConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize process-wide logging.
///
/// Reads `RUST_LOG` and falls back to `info`. Logs go to stderr so stdout
/// stays clean for command output. Fails if a global subscriber is already
/// installed.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("Rainylight logging initialized");
    Ok(())
}
