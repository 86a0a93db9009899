use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use drive_backup::config::BackupConfig;
use drive_backup::run;

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` overrides the inherited environment, matching how this runs
    // next to the archiver's cron step.
    dotenvy::dotenv_override().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BackupConfig::from_env()?;

    run::run(config).await
}
