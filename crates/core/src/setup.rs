//! Instance setup, credential validation, and teardown.
//!
//! Setup is two-phase. Credential validation happens first and maps API
//! errors onto form-level error codes; nothing is persisted when it
//! fails. Instance setup then performs the initial fetch - which must
//! succeed, so every sensor has data at creation time - materializes the
//! sensors, and starts scheduled polling.

use std::sync::Arc;

use log::info;
use thiserror::Error;

use akahu_client::{AkahuApi, ApiError};

use crate::actions::ActionService;
use crate::coordinator::{AccountCoordinator, PollHandle};
use crate::sensors::{sensors_from_snapshot, AccountSensor};
use crate::settings::BridgeOptions;

/// Setup-time validation failures.
///
/// The display form is the form-level error code shown to the user.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The credential pair was rejected (401/403).
    #[error("invalid_auth")]
    InvalidAuth,

    /// The API could not be reached or is unhealthy.
    #[error("cannot_connect")]
    CannotConnect,

    /// Anything else.
    #[error("unknown")]
    Unknown,
}

impl From<ApiError> for SetupError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth => Self::InvalidAuth,
            ApiError::Connect(_) => Self::CannotConnect,
            ApiError::FetchFailed(_) | ApiError::Unknown(_) => Self::Unknown,
        }
    }
}

/// Check the credential pair against the identity endpoint.
pub async fn validate_setup(api: &dyn AkahuApi) -> Result<(), SetupError> {
    api.validate_credentials().await.map_err(SetupError::from)
}

/// One running bridge instance: coordinator, sensors, actions, and the
/// polling task.
pub struct BridgeInstance {
    coordinator: Arc<AccountCoordinator>,
    sensors: Vec<AccountSensor>,
    actions: ActionService,
    poll: PollHandle,
}

impl BridgeInstance {
    /// Set up a bridge instance.
    ///
    /// The initial fetch must succeed; on failure the error propagates
    /// and no sensors are created. Sensors are materialized once from
    /// the first snapshot.
    pub async fn setup(
        api: Arc<dyn AkahuApi>,
        options: &BridgeOptions,
    ) -> crate::Result<Self> {
        let coordinator = AccountCoordinator::new(Arc::clone(&api), options.scan_interval());
        coordinator.first_refresh().await?;

        let sensors = sensors_from_snapshot(&coordinator);
        info!("Bridge instance ready with {} account sensors", sensors.len());

        let actions = ActionService::new(api, Arc::clone(&coordinator));
        let poll = coordinator.start();

        Ok(Self {
            coordinator,
            sensors,
            actions,
            poll,
        })
    }

    /// The coordinator backing this instance.
    pub fn coordinator(&self) -> &Arc<AccountCoordinator> {
        &self.coordinator
    }

    /// The sensors materialized from the first snapshot.
    pub fn sensors(&self) -> &[AccountSensor] {
        &self.sensors
    }

    /// The transfer/refresh action handlers.
    pub fn actions(&self) -> &ActionService {
        &self.actions
    }

    /// Cancel the polling task.
    ///
    /// An action call already in flight completes or fails independently.
    pub fn shutdown(&self) {
        self.poll.stop();
    }
}
