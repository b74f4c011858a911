//! HTTP client for the Akahu API.
//!
//! Every call attaches the same two credential headers (bearer token and
//! app id) and runs as a single attempt under a bounded timeout. Fetches
//! and the identity check report failures as [`ApiError`]; the two
//! fire-and-forget POST calls log failures and report a
//! [`CallOutcome::Rejected`] instead.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::errors::ApiError;
use crate::models::{AccountMap, AccountsResponse};

/// Default base URL for the Akahu API.
pub const DEFAULT_API_URL: &str = "https://api.akahu.io/v1";

/// Timeout for routine accounts fetches.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Timeout for the setup-time identity check.
pub const VALIDATE_TIMEOUT_SECS: u64 = 15;

/// Header carrying the Akahu app identifier.
const APP_ID_HEADER: HeaderName = HeaderName::from_static("x-akahu-id");

/// Outcome of a fire-and-forget POST call.
///
/// Rejections are already logged by the client; callers only need the
/// outcome to decide whether to follow up (e.g. fetch after an accepted
/// refresh request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The API returned HTTP 200.
    Accepted,
    /// Any other status or a transport failure.
    Rejected,
}

impl CallOutcome {
    /// Whether the call was accepted.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Trait for the Akahu API operations the bridge consumes.
///
/// The coordinator and the action handlers depend on this trait so tests
/// can drive them with [`MockAkahuApi`] instead of a live endpoint.
#[async_trait]
pub trait AkahuApi: Send + Sync {
    /// Fetch all accounts, keyed by their upstream id.
    async fn fetch_accounts(&self) -> Result<AccountMap, ApiError>;

    /// Initiate a transfer between two accounts.
    ///
    /// Never raises; a non-200 response is logged and reported as
    /// [`CallOutcome::Rejected`].
    async fn initiate_transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
    ) -> CallOutcome;

    /// Ask the upstream API to recompute its account data.
    ///
    /// The API enforces a provider-side minimum interval between refreshes
    /// (observed around 15 minutes) and signals the cooldown with a
    /// non-200 status.
    async fn request_refresh(&self) -> CallOutcome;

    /// Check the credential pair against the identity endpoint.
    async fn validate_credentials(&self) -> Result<(), ApiError>;
}

/// HTTP client for the Akahu API.
///
/// # Example
///
/// ```ignore
/// let client = AkahuApiClient::new(DEFAULT_API_URL, "user-token", "app-token")?;
/// let accounts = client.fetch_accounts().await?;
/// ```
#[derive(Debug, Clone)]
pub struct AkahuApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
    app_id_header: HeaderValue,
}

impl AkahuApiClient {
    /// Create a new Akahu API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the API (e.g. [`DEFAULT_API_URL`])
    /// * `user_token` - The bearer token identifying the user
    /// * `app_token` - The app identifier sent as `X-Akahu-ID`
    ///
    /// # Errors
    ///
    /// Returns an error if either token is not a valid header value or the
    /// HTTP client cannot be initialized.
    pub fn new(base_url: &str, user_token: &str, app_token: &str) -> Result<Self, ApiError> {
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", user_token))
            .map_err(|e| ApiError::Unknown(format!("Invalid user token format: {}", e)))?;
        let app_id_header = HeaderValue::from_str(app_token)
            .map_err(|e| ApiError::Unknown(format!("Invalid app token format: {}", e)))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Unknown(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
            app_id_header,
        })
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers.insert(APP_ID_HEADER, self.app_id_header.clone());
        headers
    }
}

#[async_trait]
impl AkahuApi for AkahuApiClient {
    async fn fetch_accounts(&self) -> Result<AccountMap, ApiError> {
        let url = format!("{}/accounts", self.base_url);
        debug!("[AkahuApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| ApiError::FetchFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::FetchFailed(format!(
                "HTTP {} - {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: AccountsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::FetchFailed(format!("invalid response body: {}", e)))?;

        let accounts: AccountMap = parsed
            .items
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        info!("[AkahuApi] Fetched {} accounts", accounts.len());
        Ok(accounts)
    }

    async fn initiate_transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
    ) -> CallOutcome {
        let url = format!("{}/transfers", self.base_url);
        let payload = serde_json::json!({
            "from": from_account,
            "to": to_account,
            "amount": amount,
        });

        match self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                info!(
                    "[AkahuApi] Transfer of {} from {} to {} accepted",
                    amount, from_account, to_account
                );
                CallOutcome::Accepted
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Failed to initiate transfer: HTTP {} - {}",
                    status,
                    body.chars().take(200).collect::<String>()
                );
                CallOutcome::Rejected
            }
            Err(e) => {
                error!("Failed to initiate transfer: {}", e);
                CallOutcome::Rejected
            }
        }
    }

    async fn request_refresh(&self) -> CallOutcome {
        let url = format!("{}/refresh", self.base_url);
        debug!("[AkahuApi] POST {}", url);

        match self.client.post(&url).headers(self.headers()).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("[AkahuApi] Akahu accepted the refresh request");
                CallOutcome::Accepted
            }
            Ok(response) => {
                warn!(
                    "Akahu refresh request failed with status {}. This may be the \
                     provider-side refresh cooldown.",
                    response.status()
                );
                CallOutcome::Rejected
            }
            Err(e) => {
                warn!("Akahu refresh request failed: {}", e);
                CallOutcome::Rejected
            }
        }
    }

    async fn validate_credentials(&self) -> Result<(), ApiError> {
        let url = format!("{}/me", self.base_url);
        debug!("[AkahuApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .timeout(Duration::from_secs(VALIDATE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(ApiError::from_validation_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(ApiError::from_validation_status(status))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock client
// ─────────────────────────────────────────────────────────────────────────────

/// Mock API client for tests - serves queued fetch results and fixed
/// outcomes, and records every call it receives.
pub struct MockAkahuApi {
    fetch_results: Mutex<VecDeque<Result<AccountMap, ApiError>>>,
    fetch_calls: AtomicUsize,
    transfers: Mutex<Vec<(String, String, f64)>>,
    transfer_outcome: Mutex<CallOutcome>,
    refresh_calls: AtomicUsize,
    refresh_outcome: Mutex<CallOutcome>,
    validation_error: Mutex<Option<ApiError>>,
}

impl Default for MockAkahuApi {
    fn default() -> Self {
        Self {
            fetch_results: Mutex::new(VecDeque::new()),
            fetch_calls: AtomicUsize::new(0),
            transfers: Mutex::new(Vec::new()),
            transfer_outcome: Mutex::new(CallOutcome::Accepted),
            refresh_calls: AtomicUsize::new(0),
            refresh_outcome: Mutex::new(CallOutcome::Accepted),
            validation_error: Mutex::new(None),
        }
    }
}

impl MockAkahuApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful accounts fetch.
    pub fn queue_accounts(&self, accounts: AccountMap) {
        self.fetch_results.lock().unwrap().push_back(Ok(accounts));
    }

    /// Queue a failed accounts fetch.
    pub fn queue_fetch_failure(&self, reason: &str) {
        self.fetch_results
            .lock()
            .unwrap()
            .push_back(Err(ApiError::FetchFailed(reason.to_string())));
    }

    /// Set the outcome served to subsequent transfer calls.
    pub fn set_transfer_outcome(&self, outcome: CallOutcome) {
        *self.transfer_outcome.lock().unwrap() = outcome;
    }

    /// Set the outcome served to subsequent refresh requests.
    pub fn set_refresh_outcome(&self, outcome: CallOutcome) {
        *self.refresh_outcome.lock().unwrap() = outcome;
    }

    /// Serve the given error to the next credential validation.
    pub fn set_validation_error(&self, error: ApiError) {
        *self.validation_error.lock().unwrap() = Some(error);
    }

    /// Number of accounts fetches issued.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of refresh requests issued.
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Every transfer issued, as `(from, to, amount)`.
    pub fn transfers(&self) -> Vec<(String, String, f64)> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl AkahuApi for MockAkahuApi {
    async fn fetch_accounts(&self) -> Result<AccountMap, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::FetchFailed("no queued response".to_string())))
    }

    async fn initiate_transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
    ) -> CallOutcome {
        self.transfers.lock().unwrap().push((
            from_account.to_string(),
            to_account.to_string(),
            amount,
        ));
        *self.transfer_outcome.lock().unwrap()
    }

    async fn request_refresh(&self) -> CallOutcome {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.refresh_outcome.lock().unwrap()
    }

    async fn validate_credentials(&self) -> Result<(), ApiError> {
        match self.validation_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AkahuApiClient::new(DEFAULT_API_URL, "user-token", "app-token");
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_url_normalization() {
        let client = AkahuApiClient::new("https://api.akahu.io/v1/", "user-token", "app-token")
            .unwrap();
        assert_eq!(client.base_url, "https://api.akahu.io/v1");
    }

    #[test]
    fn test_client_rejects_invalid_token() {
        let client = AkahuApiClient::new(DEFAULT_API_URL, "user\ntoken", "app-token");
        assert!(matches!(client, Err(ApiError::Unknown(_))));
    }

    #[test]
    fn test_headers_carry_credentials() {
        let client = AkahuApiClient::new(DEFAULT_API_URL, "user-token", "app-token").unwrap();
        let headers = client.headers();
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer user-token")
        );
        assert_eq!(
            headers.get("x-akahu-id").and_then(|v| v.to_str().ok()),
            Some("app-token")
        );
    }

    #[tokio::test]
    async fn test_mock_serves_queued_fetches_in_order() {
        let mock = MockAkahuApi::new();
        mock.queue_accounts(AccountMap::new());
        mock.queue_fetch_failure("HTTP 500");

        assert!(mock.fetch_accounts().await.is_ok());
        assert!(mock.fetch_accounts().await.is_err());
        // Exhausted queue keeps failing rather than panicking.
        assert!(mock.fetch_accounts().await.is_err());
        assert_eq!(mock.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_transfers() {
        let mock = MockAkahuApi::new();
        mock.set_transfer_outcome(CallOutcome::Rejected);

        let outcome = mock.initiate_transfer("acc_a", "acc_b", 12.5).await;
        assert_eq!(outcome, CallOutcome::Rejected);
        assert_eq!(
            mock.transfers(),
            vec![("acc_a".to_string(), "acc_b".to_string(), 12.5)]
        );
    }
}
