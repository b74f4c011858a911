//! Lenient models for the Akahu accounts payload.
//!
//! The upstream record is a partially-specified structure: apart from the
//! id and the display name, every field may be absent, and consumers are
//! expected to handle the absent case explicitly rather than rely on
//! implicit defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Accounts keyed by their upstream id.
///
/// The id is stable across polls and is the sole join key between
/// successive snapshots and the sensors derived from them.
pub type AccountMap = HashMap<String, Account>;

/// Institution connection metadata nested in an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountConnection {
    /// Institution display name, e.g. "ANZ".
    #[serde(default)]
    pub name: Option<String>,
}

/// Balance figures nested in an account.
///
/// Amounts are plain JSON floats upstream, so they stay `f64` here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Current balance.
    #[serde(default)]
    pub current: Option<f64>,
    /// Available balance, usually current minus holds.
    #[serde(default)]
    pub available: Option<f64>,
    /// ISO 4217 currency code, e.g. "NZD".
    #[serde(default)]
    pub currency: Option<String>,
}

/// One upstream account as returned by the accounts list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Upstream identifier, stable across polls.
    #[serde(rename = "_id")]
    pub id: String,
    /// Account display name, e.g. "Everyday".
    pub name: String,
    /// Institution connection this account belongs to.
    #[serde(default)]
    pub connection: Option<AccountConnection>,
    /// Balance figures.
    #[serde(default)]
    pub balance: Option<AccountBalance>,
    /// Account type string, e.g. "CHECKING".
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    /// Upstream status string, e.g. "ACTIVE".
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable account number, e.g. "12-3456-7890123-00".
    #[serde(default)]
    pub formatted_account: Option<String>,
}

impl Account {
    /// Institution name from the nested connection, if present.
    pub fn institution(&self) -> Option<&str> {
        self.connection.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Display name combining institution and account name.
    ///
    /// Falls back to the literal "Unknown" when the institution is absent.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.institution().unwrap_or("Unknown"), self.name)
    }

    /// Current balance figure, if present.
    pub fn current_balance(&self) -> Option<f64> {
        self.balance.as_ref().and_then(|b| b.current)
    }

    /// Available balance figure, if present.
    pub fn available_balance(&self) -> Option<f64> {
        self.balance.as_ref().and_then(|b| b.available)
    }

    /// Balance currency code, if present.
    pub fn currency(&self) -> Option<&str> {
        self.balance.as_ref().and_then(|b| b.currency.as_deref())
    }
}

/// Raw accounts-list response.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountsResponse {
    #[serde(default)]
    pub items: Vec<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_account_parses() {
        let account: Account = serde_json::from_str(
            r#"{
                "_id": "acc_1",
                "name": "Everyday",
                "connection": {"name": "Bank"},
                "balance": {"current": 100.5, "available": 95.0, "currency": "NZD"},
                "type": "CHECKING",
                "status": "ACTIVE",
                "formatted_account": "12-3456-7890123-00"
            }"#,
        )
        .unwrap();

        assert_eq!(account.id, "acc_1");
        assert_eq!(account.name, "Everyday");
        assert_eq!(account.institution(), Some("Bank"));
        assert_eq!(account.display_name(), "Bank Everyday");
        assert_eq!(account.current_balance(), Some(100.5));
        assert_eq!(account.available_balance(), Some(95.0));
        assert_eq!(account.currency(), Some("NZD"));
        assert_eq!(account.account_type.as_deref(), Some("CHECKING"));
        assert_eq!(account.status.as_deref(), Some("ACTIVE"));
        assert_eq!(
            account.formatted_account.as_deref(),
            Some("12-3456-7890123-00")
        );
    }

    #[test]
    fn test_minimal_account_parses() {
        let account: Account =
            serde_json::from_str(r#"{"_id": "acc_2", "name": "Savings"}"#).unwrap();

        assert_eq!(account.id, "acc_2");
        assert_eq!(account.institution(), None);
        assert_eq!(account.current_balance(), None);
        assert_eq!(account.available_balance(), None);
        assert_eq!(account.currency(), None);
        assert_eq!(account.account_type, None);
        assert_eq!(account.status, None);
        assert_eq!(account.formatted_account, None);
    }

    #[test]
    fn test_display_name_defaults_institution_to_unknown() {
        let account: Account =
            serde_json::from_str(r#"{"_id": "acc_3", "name": "Loan"}"#).unwrap();
        assert_eq!(account.display_name(), "Unknown Loan");

        // A connection object without a name is treated the same as no
        // connection at all.
        let account: Account = serde_json::from_str(
            r#"{"_id": "acc_4", "name": "Loan", "connection": {}}"#,
        )
        .unwrap();
        assert_eq!(account.display_name(), "Unknown Loan");
    }

    #[test]
    fn test_partial_balance_parses() {
        let account: Account = serde_json::from_str(
            r#"{"_id": "acc_5", "name": "Card", "balance": {"current": -42.0}}"#,
        )
        .unwrap();

        assert_eq!(account.current_balance(), Some(-42.0));
        assert_eq!(account.available_balance(), None);
        assert_eq!(account.currency(), None);
    }

    #[test]
    fn test_accounts_response_defaults_to_empty_items() {
        let response: AccountsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
    }
}
