//! Akahu API client crate.
//!
//! This crate provides the HTTP client for the Akahu open-finance API,
//! covering the four operations the bridge consumes:
//!
//! - Listing accounts (`GET /accounts`), re-keyed by account id
//! - Initiating transfers (`POST /transfers`)
//! - Requesting an upstream data refresh (`POST /refresh`)
//! - Validating a credential pair (`GET /me`)
//!
//! All calls are single-shot: there is no retry, backoff, or circuit
//! breaking at this layer. A failed attempt is reported to the caller
//! immediately, either as an [`ApiError`] or as a logged
//! [`CallOutcome::Rejected`].
//!
//! The [`AkahuApi`] trait is the seam consumers should depend on; the
//! concrete [`AkahuApiClient`] implements it over `reqwest`, and
//! [`MockAkahuApi`] serves queued responses for tests.

pub mod client;
pub mod errors;
pub mod models;

pub use client::{
    AkahuApi, AkahuApiClient, CallOutcome, MockAkahuApi, DEFAULT_API_URL, FETCH_TIMEOUT_SECS,
    VALIDATE_TIMEOUT_SECS,
};
pub use errors::ApiError;
pub use models::{Account, AccountBalance, AccountConnection, AccountMap};
