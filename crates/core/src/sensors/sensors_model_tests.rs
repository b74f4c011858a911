//! Tests for sensor materialization and live reads.

use std::sync::Arc;
use std::time::Duration;

use akahu_client::{Account, AccountBalance, AccountConnection, AccountMap, MockAkahuApi};

use super::{sensors_from_snapshot, SensorAttributes};
use crate::coordinator::AccountCoordinator;

fn everyday_account() -> Account {
    Account {
        id: "a1".to_string(),
        name: "Everyday".to_string(),
        connection: Some(AccountConnection {
            name: Some("Bank".to_string()),
        }),
        balance: Some(AccountBalance {
            current: Some(100.5),
            available: Some(95.0),
            currency: Some("NZD".to_string()),
        }),
        account_type: Some("CHECKING".to_string()),
        status: Some("ACTIVE".to_string()),
        formatted_account: Some("12-3456-7890123-00".to_string()),
    }
}

fn bare_account(id: &str, name: &str) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        connection: None,
        balance: None,
        account_type: None,
        status: None,
        formatted_account: None,
    }
}

fn snapshot_of(accounts: Vec<Account>) -> AccountMap {
    accounts
        .into_iter()
        .map(|account| (account.id.clone(), account))
        .collect()
}

async fn coordinator_with(
    api: &Arc<MockAkahuApi>,
    accounts: Vec<Account>,
) -> Arc<AccountCoordinator> {
    api.queue_accounts(snapshot_of(accounts));
    let coordinator = AccountCoordinator::new(api.clone(), Duration::from_secs(900));
    coordinator.first_refresh().await.unwrap();
    coordinator
}

#[tokio::test]
async fn test_sensor_derives_name_unit_and_value() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(&api, vec![everyday_account()]).await;

    let sensors = sensors_from_snapshot(&coordinator);
    assert_eq!(sensors.len(), 1);

    let sensor = &sensors[0];
    assert_eq!(sensor.unique_id(), "a1");
    assert_eq!(sensor.name(), "Bank Everyday");
    assert_eq!(sensor.unit(), Some("NZD"));
    assert_eq!(sensor.native_value(), Some(100.5));
    assert!(sensor.available());

    let attributes = sensor.attributes();
    assert_eq!(attributes.account_type.as_deref(), Some("CHECKING"));
    assert_eq!(attributes.available_balance, Some(95.0));
    assert_eq!(attributes.institution.as_deref(), Some("Bank"));
    assert_eq!(attributes.upstream_id.as_deref(), Some("a1"));
    assert_eq!(attributes.status.as_deref(), Some("ACTIVE"));
    assert_eq!(
        attributes.formatted_account_number.as_deref(),
        Some("12-3456-7890123-00")
    );
}

#[tokio::test]
async fn test_sensor_defaults_institution_to_unknown() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(&api, vec![bare_account("a2", "Loan")]).await;

    let sensors = sensors_from_snapshot(&coordinator);
    let sensor = &sensors[0];
    assert_eq!(sensor.name(), "Unknown Loan");
    assert_eq!(sensor.unit(), None);
    assert_eq!(sensor.native_value(), None);
    assert_eq!(sensor.attributes(), SensorAttributes {
        upstream_id: Some("a2".to_string()),
        ..SensorAttributes::default()
    });
}

#[tokio::test]
async fn test_sensor_reads_live_values_after_refresh() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(&api, vec![everyday_account()]).await;
    let sensors = sensors_from_snapshot(&coordinator);

    let mut updated = everyday_account();
    updated.balance = Some(AccountBalance {
        current: Some(77.25),
        available: Some(70.0),
        currency: Some("NZD".to_string()),
    });
    api.queue_accounts(snapshot_of(vec![updated]));
    coordinator.refresh().await;

    let sensor = &sensors[0];
    assert_eq!(sensor.native_value(), Some(77.25));
    assert_eq!(sensor.attributes().available_balance, Some(70.0));
}

#[tokio::test]
async fn test_sensor_goes_unavailable_but_keeps_last_value() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(&api, vec![everyday_account()]).await;
    let sensors = sensors_from_snapshot(&coordinator);

    api.queue_fetch_failure("HTTP 500");
    coordinator.refresh().await;

    let sensor = &sensors[0];
    assert!(!sensor.available());
    // Stale but still the previous figure, not a reset.
    assert_eq!(sensor.native_value(), Some(100.5));
}

#[tokio::test]
async fn test_new_accounts_do_not_grow_the_sensor_set() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(&api, vec![everyday_account()]).await;
    let sensors = sensors_from_snapshot(&coordinator);
    assert_eq!(sensors.len(), 1);

    api.queue_accounts(snapshot_of(vec![
        everyday_account(),
        bare_account("a9", "New Card"),
    ]));
    coordinator.refresh().await;

    // The snapshot grew; the sensor set did not.
    assert_eq!(coordinator.snapshot().unwrap().len(), 2);
    assert_eq!(sensors.len(), 1);
}

#[tokio::test]
async fn test_sensor_for_vanished_account_reads_none() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(
        &api,
        vec![everyday_account(), bare_account("a2", "Savings")],
    )
    .await;
    let sensors = sensors_from_snapshot(&coordinator);
    assert_eq!(sensors.len(), 2);

    api.queue_accounts(snapshot_of(vec![everyday_account()]));
    coordinator.refresh().await;

    let vanished = sensors
        .iter()
        .find(|sensor| sensor.unique_id() == "a2")
        .unwrap();
    assert_eq!(vanished.native_value(), None);
    assert_eq!(vanished.attributes(), SensorAttributes::default());
    // Availability tracks the coordinator, not the individual account.
    assert!(vanished.available());
}

#[tokio::test]
async fn test_sensors_sorted_by_account_id() {
    let api = Arc::new(MockAkahuApi::new());
    let coordinator = coordinator_with(
        &api,
        vec![
            bare_account("c3", "Card"),
            bare_account("a1", "Everyday"),
            bare_account("b2", "Savings"),
        ],
    )
    .await;

    let sensors = sensors_from_snapshot(&coordinator);
    let ids: Vec<String> = sensors
        .iter()
        .map(|sensor| sensor.unique_id().to_string())
        .collect();
    assert_eq!(ids, vec!["a1", "b2", "c3"]);
}
