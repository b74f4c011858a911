//! Read-only sensors derived from account records.
//!
//! A sensor holds only its account id and a reference to the shared
//! coordinator - no private copy of balance data. The display name and
//! unit are fixed when the sensor is created; value, attributes, and
//! availability re-derive from the live snapshot on every read.

use std::sync::Arc;

use serde::Serialize;

use akahu_client::Account;

use crate::coordinator::AccountCoordinator;

/// Auxiliary attributes exposed alongside a sensor's value.
///
/// Each field is individually nullable: an upstream record that omits a
/// field yields `None` rather than an error or a zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub account_type: Option<String>,
    pub available_balance: Option<f64>,
    pub institution: Option<String>,
    pub upstream_id: Option<String>,
    pub status: Option<String>,
    pub formatted_account_number: Option<String>,
}

/// One read-only numeric sensor derived from a single upstream account.
pub struct AccountSensor {
    coordinator: Arc<AccountCoordinator>,
    account_id: String,
    name: String,
    unit: Option<String>,
}

impl AccountSensor {
    pub(crate) fn new(coordinator: Arc<AccountCoordinator>, account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            name: account.display_name(),
            // Read once at creation. If the currency changes upstream the
            // unit goes stale; that is a known gap, not defended against.
            unit: account.currency().map(str::to_string),
            coordinator,
        }
    }

    /// Stable identifier: the upstream account id.
    pub fn unique_id(&self) -> &str {
        &self.account_id
    }

    /// Display name, `"{institution} {account name}"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit of measurement: the balance currency at creation time.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Whether the coordinator's last fetch succeeded.
    ///
    /// When false, consumers must treat [`native_value`](Self::native_value)
    /// as stale rather than as a reported figure.
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    /// Current balance, re-read from the live snapshot.
    pub fn native_value(&self) -> Option<f64> {
        self.coordinator
            .account(&self.account_id)
            .and_then(|account| account.current_balance())
    }

    /// Auxiliary attributes, re-read from the live snapshot.
    pub fn attributes(&self) -> SensorAttributes {
        match self.coordinator.account(&self.account_id) {
            Some(account) => SensorAttributes {
                account_type: account.account_type.clone(),
                available_balance: account.available_balance(),
                institution: account.institution().map(str::to_string),
                upstream_id: Some(account.id.clone()),
                status: account.status.clone(),
                formatted_account_number: account.formatted_account.clone(),
            },
            None => SensorAttributes::default(),
        }
    }
}

/// Materialize one sensor per account in the current snapshot.
///
/// Sensor identity is fixed here: accounts appearing in later polls enter
/// the snapshot but do not grow the sensor set. Returns an empty vec when
/// no snapshot exists yet.
pub fn sensors_from_snapshot(coordinator: &Arc<AccountCoordinator>) -> Vec<AccountSensor> {
    let Some(snapshot) = coordinator.snapshot() else {
        return Vec::new();
    };

    let mut sensors: Vec<AccountSensor> = snapshot
        .values()
        .map(|account| AccountSensor::new(Arc::clone(coordinator), account))
        .collect();
    // Deterministic order for callers that enumerate sensors.
    sensors.sort_by(|a, b| a.account_id.cmp(&b.account_id));
    sensors
}
