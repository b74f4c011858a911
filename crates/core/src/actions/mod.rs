//! Host-facing actions: `transfer` and `refresh`.

mod actions_service;


pub use actions_service::{ActionError, ActionService, TransferRequest};
