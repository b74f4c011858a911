//! Akahu bridge core - coordinator, sensors, actions, and lifecycle.
//!
//! This crate turns the raw Akahu API into observable state:
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |    AkahuApi      | --> |   Coordinator    | --> |     Sensors      |
//! |  (HTTP client)   |     |    (snapshot)    |     |   (live views)   |
//! +------------------+     +------------------+     +------------------+
//!          ^                        ^
//!          |                        |
//!          +------ ActionService ---+   (transfer / refresh)
//! ```
//!
//! Data flows one direction: the client fetches, the coordinator owns the
//! snapshot and fans out notifications, and sensors re-derive their values
//! from the live snapshot on every read. Control flows the other way for
//! actions: a transfer bypasses the snapshot entirely, and a manual
//! refresh forces an out-of-band fetch once the upstream accepts it.
//!
//! # Core Types
//!
//! - [`AccountCoordinator`] - snapshot ownership, polling, notifications
//! - [`AccountSensor`] - one read-only view per account
//! - [`ActionService`] - host-facing `transfer` / `refresh` handlers
//! - [`BridgeInstance`] - one configured instance, setup to teardown
//! - [`InstanceRegistry`] - instance-keyed table owned by the app context

pub mod actions;
pub mod coordinator;
pub mod errors;
pub mod registry;
pub mod sensors;
pub mod settings;
pub mod setup;

pub use actions::{ActionError, ActionService, TransferRequest};
pub use coordinator::{AccountCoordinator, ListenerHandle, PollHandle};
pub use errors::{Error, Result};
pub use registry::InstanceRegistry;
pub use sensors::{sensors_from_snapshot, AccountSensor, SensorAttributes};
pub use settings::{BridgeConfig, BridgeOptions, Credentials, DEFAULT_SCAN_INTERVAL_MINUTES};
pub use setup::{validate_setup, BridgeInstance, SetupError};
