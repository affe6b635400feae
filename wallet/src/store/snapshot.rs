//! # Application Snapshot
//!
//! The slice of engine state the three screens read: currency settings,
//! account and token balances, exchange rates, the tracked token list, and
//! the in-progress send draft.
//!
//! Field names follow the engine's camelCase JSON so a snapshot dumped by
//! the app deserializes as-is. Hex address keys are matched
//! case-insensitively; checksummed and lower-case spellings of the same
//! address hit the same entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::assets::{addresses_match, Asset};
use crate::config::DEFAULT_TICKER;
use crate::units::{PrimaryCurrency, TokenAmount};

/// Errors loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-account engine data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Native balance in wei.
    pub balance: TokenAmount,
}

/// The raw transaction fields of a send draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Sender address.
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    /// Amount in minimal units of the selected asset.
    #[serde(default)]
    pub value: Option<TokenAmount>,
}

/// An in-progress transfer, as assembled by the send flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// The asset being sent.
    pub selected_asset: Asset,
    pub transaction: PendingTransaction,
    #[serde(default)]
    pub transaction_to: Option<String>,
    #[serde(default)]
    pub transaction_to_name: Option<String>,
    #[serde(default)]
    pub transaction_from_name: Option<String>,
    /// Human-entered amount as typed in the send screen.
    #[serde(default)]
    pub transaction_value: Option<String>,
}

/// Read-only view of the application store at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSnapshot {
    /// Display currency code, e.g. `usd`.
    pub current_currency: String,
    /// Native unit → display currency.
    pub conversion_rate: f64,
    pub primary_currency: PrimaryCurrency,
    /// Native unit ticker reported by the network provider.
    pub ticker: Option<String>,
    /// Account currently selected in the wallet.
    pub selected_address: Option<String>,
    pub accounts: HashMap<String, AccountInfo>,
    /// Token address → balance in the token's minimal units.
    pub contract_balances: HashMap<String, TokenAmount>,
    /// Token address → price in native units.
    pub contract_exchange_rates: HashMap<String, f64>,
    /// Tracked tokens, in display order.
    pub tokens: Vec<Asset>,
    /// Opaque transaction history, forwarded to the asset screen.
    pub transactions: Vec<serde_json::Value>,
    pub new_transaction: Option<TransactionDraft>,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            current_currency: "usd".to_string(),
            conversion_rate: 0.0,
            primary_currency: PrimaryCurrency::default(),
            ticker: None,
            selected_address: None,
            accounts: HashMap::new(),
            contract_balances: HashMap::new(),
            contract_exchange_rates: HashMap::new(),
            tokens: Vec::new(),
            transactions: Vec::new(),
            new_transaction: None,
        }
    }
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, address: &str) -> Option<&'a V> {
    map.get(address).or_else(|| {
        map.iter()
            .find(|(key, _)| addresses_match(key, address))
            .map(|(_, value)| value)
    })
}

impl AppSnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Account data for `address`, if the engine tracks it.
    pub fn account(&self, address: &str) -> Option<&AccountInfo> {
        lookup(&self.accounts, address)
    }

    /// Native balance of the selected account.
    pub fn selected_balance(&self) -> Option<TokenAmount> {
        let address = self.selected_address.as_deref()?;
        self.account(address).map(|info| info.balance)
    }

    /// Token balance for `address`, if known.
    pub fn contract_balance(&self, address: &str) -> Option<TokenAmount> {
        lookup(&self.contract_balances, address).copied()
    }

    /// Token exchange rate for `address`, if known.
    ///
    /// A rate of zero is reported as missing. The rates controller writes
    /// zero for tokens it has no market data for.
    pub fn exchange_rate(&self, address: &str) -> Option<f64> {
        lookup(&self.contract_exchange_rates, address)
            .copied()
            .filter(|rate| *rate != 0.0)
    }

    /// The native unit ticker, defaulting to `ETH`.
    pub fn ticker(&self) -> &str {
        self.ticker
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TICKER)
    }
}
