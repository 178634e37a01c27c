//! Print the account's devices, and the configured light's status if one is set.

use anyhow::{Context, Result};
use rainylight::error;
use rainylight_core::{AppError, Config};
use rainylight_switchbot::DeviceClient;

#[tokio::main]
async fn main() -> Result<()> {
    rainylight_core::init()?;

    let config = Config::from_env_validated(false)
        .map_err(|e| error::report(AppError::from(e)))
        .context("Failed to load configuration")?;
    let client = DeviceClient::new(&config.switchbot, &config.http)
        .map_err(|e| error::report(error::from_device(e)))?;

    let devices = client
        .list_all_devices()
        .await
        .map_err(|e| error::report(error::from_device(e)))
        .context("Failed to list devices")?;
    println!("{}", serde_json::to_string_pretty(&devices)?);

    if let Some(device_id) = &config.switchbot.device_id {
        let status = client
            .get_device_status(device_id)
            .await
            .map_err(|e| error::report(error::from_device(e)))
            .with_context(|| format!("Failed to read status of {}", device_id))?;
        println!("{}", serde_json::to_string_pretty(&status)?);
    }

    Ok(())
}
