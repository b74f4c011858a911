//! Core error types for the Akahu bridge.

use thiserror::Error;

use crate::actions::ActionError;
use crate::setup::SetupError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the bridge.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Akahu API error: {0}")]
    Api(#[from] akahu_client::ApiError),

    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),
}
