//! Error types for the Akahu API client.

use thiserror::Error;

/// Errors returned by Akahu API operations.
///
/// Setup-time validation distinguishes authentication from connectivity
/// problems so the caller can surface the right form error; steady-state
/// accounts fetches collapse everything into [`ApiError::FetchFailed`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API rejected the credential pair (HTTP 401/403).
    #[error("Akahu rejected the credentials")]
    Auth,

    /// The API could not be reached, timed out, or is unhealthy (429/5xx).
    #[error("Could not reach the Akahu API: {0}")]
    Connect(String),

    /// An accounts-list fetch failed. Covers transport failures, non-2xx
    /// statuses, and unparseable bodies alike.
    #[error("Accounts fetch failed: {0}")]
    FetchFailed(String),

    /// Any other unexpected response.
    #[error("Unexpected Akahu API response: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Classify a non-success status from the identity check.
    ///
    /// 401/403 mean the credential pair is bad; 429 and 5xx mean the API
    /// is unhealthy or throttling and the caller should try again later;
    /// anything else is unexpected.
    pub fn from_validation_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth,
            429 | 500..=599 => Self::Connect(format!("HTTP {}", status)),
            _ => Self::Unknown(format!("HTTP {}", status)),
        }
    }

    /// Classify a transport-level failure from the identity check.
    ///
    /// Timeouts and connection errors are both connectivity problems from
    /// the caller's point of view.
    pub fn from_validation_transport(err: reqwest::Error) -> Self {
        Self::Connect(err.to_string())
    }
}
