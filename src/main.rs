use anyhow::{Context, Result};
use rainylight::{error, Orchestrator};
use rainylight_core::{AppError, Config};

#[tokio::main]
async fn main() -> Result<()> {
    rainylight_core::init()?;

    let config = Config::from_env_validated(true)
        .map_err(|e| error::report(AppError::from(e)))
        .context("Failed to load configuration")?;
    let orchestrator = Orchestrator::new(&config).map_err(error::report)?;

    let report = orchestrator.run().await;
    report.log_summary();

    // Command failures are logged above; only configuration problems exit non-zero
    Ok(())
}
