//! Action payload validation and handlers.
//!
//! Actions are fire-and-forget from the caller's perspective: outcomes are
//! visible via logs and state only. The exception is payload validation,
//! which rejects a malformed call before any HTTP request is issued.

use std::sync::Arc;

use log::info;
use serde_json::Value;
use thiserror::Error;

use akahu_client::AkahuApi;

use crate::coordinator::AccountCoordinator;

/// Validation failures for action payloads.
///
/// These surface to the action caller; everything past validation is
/// logged and dropped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// A required field was absent or null.
    #[error("missing required field {0:?}")]
    MissingField(&'static str),

    /// An account reference was not a string.
    #[error("field {0:?} must be a string")]
    InvalidAccountRef(&'static str),

    /// The amount could not be coerced to a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// A validated transfer payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
}

impl TransferRequest {
    /// Validate a loosely-typed transfer payload.
    ///
    /// `from_account` and `to_account` must be strings; `amount` must be a
    /// number or a numeric string ("12.50" is coerced, "abc" is rejected).
    pub fn parse(payload: &Value) -> Result<Self, ActionError> {
        Ok(Self {
            from_account: string_field(payload, "from_account")?,
            to_account: string_field(payload, "to_account")?,
            amount: amount_field(payload, "amount")?,
        })
    }
}

fn string_field(payload: &Value, field: &'static str) -> Result<String, ActionError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ActionError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ActionError::InvalidAccountRef(field)),
    }
}

fn amount_field(payload: &Value, field: &'static str) -> Result<f64, ActionError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ActionError::MissingField(field)),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ActionError::InvalidAmount(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ActionError::InvalidAmount(s.clone())),
        Some(other) => Err(ActionError::InvalidAmount(other.to_string())),
    }
}

/// Handlers for the host-facing `transfer` and `refresh` actions.
pub struct ActionService {
    api: Arc<dyn AkahuApi>,
    coordinator: Arc<AccountCoordinator>,
}

impl ActionService {
    pub fn new(api: Arc<dyn AkahuApi>, coordinator: Arc<AccountCoordinator>) -> Self {
        Self { api, coordinator }
    }

    /// Validate and forward a transfer.
    ///
    /// Payload validation errors are returned to the caller. An upstream
    /// rejection is already logged by the client and is not surfaced -
    /// there is no retry.
    pub async fn handle_transfer(&self, payload: &Value) -> Result<(), ActionError> {
        let request = TransferRequest::parse(payload)?;
        info!(
            "Initiating transfer of {} from {} to {}",
            request.amount, request.from_account, request.to_account
        );
        self.api
            .initiate_transfer(&request.from_account, &request.to_account, request.amount)
            .await;
        Ok(())
    }

    /// Ask upstream to recompute, then refresh the snapshot if accepted.
    pub async fn handle_refresh(&self) {
        info!("Requesting manual refresh from the Akahu API");
        self.coordinator.request_refresh().await;
    }
}
