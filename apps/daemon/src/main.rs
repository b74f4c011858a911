//! Headless Akahu bridge daemon.
//!
//! Stands in for a host platform: sets up one bridge instance from
//! environment configuration, logs every sensor's state after each
//! refresh, and tears the instance down on ctrl-c.

mod config;

use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use akahu_client::{AkahuApi, AkahuApiClient};
use akahu_core::{validate_setup, BridgeInstance, InstanceRegistry};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = config::from_env()?;

    let api: Arc<dyn AkahuApi> = Arc::new(AkahuApiClient::new(
        &config.api_url,
        &config.credentials.user_token,
        &config.credentials.app_token,
    )?);

    if let Err(code) = validate_setup(api.as_ref()).await {
        anyhow::bail!("credential validation failed: {}", code);
    }

    let instance = Arc::new(BridgeInstance::setup(api, &config.options).await?);

    let registry = InstanceRegistry::new();
    registry.insert("primary", Arc::clone(&instance));

    let observed = Arc::clone(&instance);
    let _listener = instance.coordinator().add_listener(move || {
        for sensor in observed.sensors() {
            tracing::info!(
                "{} = {:?} {} (available: {})",
                sensor.name(),
                sensor.native_value(),
                sensor.unit().unwrap_or(""),
                sensor.available()
            );
        }
    });

    tracing::info!(
        "Bridge running with {} sensors, polling every {} minutes",
        instance.sensors().len(),
        config.options.scan_interval_minutes
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    let _ = registry.remove("primary");
    Ok(())
}
