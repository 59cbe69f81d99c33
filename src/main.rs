//! schedulerd entry point: load configuration, start the tick engine, and
//! run until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use schedulerd::domain::ports::MetadataClient;
use schedulerd::infrastructure::config::ConfigLoader;
use schedulerd::infrastructure::http::HttpMetadataClient;
use schedulerd::infrastructure::logging;
use schedulerd::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ConfigLoader::load(config_path.as_deref()).context("failed to load configuration")?;

    logging::init(&config.logging);

    let metadata_client: Arc<dyn MetadataClient> = Arc::new(
        HttpMetadataClient::new(
            config.metadata_client.base_url(),
            Duration::from_millis(config.service_timeout_ms),
        )
        .context("failed to build metadata client")?,
    );

    let scheduler = Scheduler::new(&config, metadata_client)
        .await
        .context("failed to initialize scheduler")?;

    tracing::info!(tick_interval_ms = config.tick_interval_ms, "scheduler starting");
    let tick_handle = scheduler.start();

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");
    scheduler.stop();
    tick_handle.await.context("tick engine task panicked")?;

    Ok(())
}
