//! Environment-based daemon configuration.

use anyhow::Context;

use akahu_client::DEFAULT_API_URL;
use akahu_core::{BridgeConfig, BridgeOptions, Credentials, DEFAULT_SCAN_INTERVAL_MINUTES};

/// Build the bridge configuration from environment variables.
///
/// `AKAHU_USER_TOKEN` and `AKAHU_APP_TOKEN` are required;
/// `AKAHU_API_URL` and `AKAHU_SCAN_INTERVAL_MINUTES` are optional.
pub fn from_env() -> anyhow::Result<BridgeConfig> {
    let user_token =
        std::env::var("AKAHU_USER_TOKEN").context("AKAHU_USER_TOKEN is not set")?;
    let app_token = std::env::var("AKAHU_APP_TOKEN").context("AKAHU_APP_TOKEN is not set")?;

    let api_url =
        std::env::var("AKAHU_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    let scan_interval_minutes = match std::env::var("AKAHU_SCAN_INTERVAL_MINUTES") {
        Ok(value) => value
            .parse()
            .context("AKAHU_SCAN_INTERVAL_MINUTES must be an integer")?,
        Err(_) => DEFAULT_SCAN_INTERVAL_MINUTES,
    };

    Ok(BridgeConfig {
        credentials: Credentials {
            user_token,
            app_token,
        },
        options: BridgeOptions {
            scan_interval_minutes,
        },
        api_url,
    })
}
