//! Configuration models.
//!
//! These are the values a host persists for one bridge instance: the
//! credential pair, an optional API base URL override, and the polling
//! cadence option.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use akahu_client::DEFAULT_API_URL;

/// Default polling cadence in minutes.
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 15;

/// Credential pair identifying one Akahu app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token for the user.
    pub user_token: String,
    /// Application identifier sent as the `X-Akahu-ID` header.
    pub app_token: String,
}

/// User-adjustable options for one bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeOptions {
    /// Polling cadence in whole minutes.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_minutes: u64,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
        }
    }
}

impl BridgeOptions {
    /// Polling cadence as a duration.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes * 60)
    }
}

/// Full persisted configuration for one bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub options: BridgeOptions,
    /// API base URL, overridable for testing against a stub server.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_MINUTES
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
