//! # Send Confirmation
//!
//! The last screen of the send flow. The sender's balance is computed once
//! at mount time and kept for the lifetime of the screen, even if the
//! snapshot moves on underneath it.

use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::Mount;
use crate::store::{AppSnapshot, TransactionDraft};
use crate::units::{render_from_token_minimal_unit, render_from_wei, TokenAmount, UnitsError};

/// Placeholder values of the breakdown rows until fee estimation exists.
const AMOUNT_PLACEHOLDER: &str = "$$Amount";
const FEE_PLACEHOLDER: &str = "$$fee";
const TOTAL_PLACEHOLDER: &str = "$$amount";

#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("no transaction is being prepared")]
    NoDraft,

    #[error("unknown sender account {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// A label/value line of the fee breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
    /// Rendered in bold.
    pub emphasized: bool,
}

/// Everything the confirmation screen shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmSummary {
    pub from: String,
    pub from_name: Option<String>,
    pub from_balance: String,
    pub to: Option<String>,
    pub to_name: Option<String>,
    /// The amount as the user typed it.
    pub amount: Option<String>,
    pub breakdown: Vec<SummaryRow>,
}

/// The confirmation screen.
#[derive(Debug)]
pub struct SendConfirm {
    draft: TransactionDraft,
    from_account_balance: String,
    mount: Mount,
}

impl SendConfirm {
    /// Mounts the screen over the draft in `snapshot`.
    pub fn mount(snapshot: &AppSnapshot) -> Result<Self, ConfirmError> {
        let draft = snapshot
            .new_transaction
            .clone()
            .ok_or(ConfirmError::NoDraft)?;
        let from_account_balance = sender_balance(snapshot, &draft)?;
        tracing::debug!(from = %draft.transaction.from, balance = %from_account_balance, "confirm mounted");
        Ok(Self {
            draft,
            from_account_balance,
            mount: Mount::new(),
        })
    }

    /// Sender balance captured at mount.
    pub fn from_account_balance(&self) -> &str {
        &self.from_account_balance
    }

    pub fn summary(&self) -> ConfirmSummary {
        let row = |label, value: &str, emphasized| SummaryRow {
            label,
            value: value.to_string(),
            emphasized,
        };
        ConfirmSummary {
            from: self.draft.transaction.from.clone(),
            from_name: self.draft.transaction_from_name.clone(),
            from_balance: self.from_account_balance.clone(),
            to: self
                .draft
                .transaction_to
                .clone()
                .or_else(|| self.draft.transaction.to.clone()),
            to_name: self.draft.transaction_to_name.clone(),
            amount: self.draft.transaction_value.clone(),
            breakdown: vec![
                row("Amount", AMOUNT_PLACEHOLDER, false),
                row("Transaction fee", FEE_PLACEHOLDER, false),
                row("Total amount", TOTAL_PLACEHOLDER, true),
            ],
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }
}

fn sender_balance(snapshot: &AppSnapshot, draft: &TransactionDraft) -> Result<String, ConfirmError> {
    let asset = &draft.selected_asset;
    if asset.is_native {
        let from = &draft.transaction.from;
        let account = snapshot
            .account(from)
            .ok_or_else(|| ConfirmError::UnknownAccount(from.clone()))?;
        Ok(format!(
            "{} {}",
            render_from_wei(account.balance.get()),
            snapshot.ticker()
        ))
    } else {
        let balance = snapshot
            .contract_balance(&asset.address)
            .unwrap_or(TokenAmount::ZERO);
        Ok(format!(
            "{} {}",
            render_from_token_minimal_unit(balance.get(), asset.decimals)?,
            asset.symbol
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Asset;
    use crate::store::{AccountInfo, PendingTransaction};
    use std::collections::HashMap;

    const FROM: &str = "0xC4955C0d639D99699Bfd7Ec54d9FaFEe40e4D272";
    const TO: &str = "0x3DC6b2A2b4b76d2D6b5e5A1fA0B8d5Ff66fEbA11";
    const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    fn draft(asset: Asset) -> TransactionDraft {
        TransactionDraft {
            selected_asset: asset,
            transaction: PendingTransaction {
                from: FROM.to_string(),
                to: Some(TO.to_string()),
                value: Some(TokenAmount::new(100_000_000_000_000_000)),
            },
            transaction_to: Some(TO.to_string()),
            transaction_to_name: Some("Bob".into()),
            transaction_from_name: Some("Account 1".into()),
            transaction_value: Some("0.1".into()),
        }
    }

    fn snapshot(asset: Asset) -> AppSnapshot {
        AppSnapshot {
            accounts: HashMap::from([(
                FROM.to_lowercase(),
                AccountInfo {
                    balance: TokenAmount::new(3_141_592_653_589_793_238),
                },
            )]),
            contract_balances: HashMap::from([(
                DAI.to_string(),
                TokenAmount::new(42_000_000_000_000_000_000),
            )]),
            new_transaction: Some(draft(asset)),
            ..AppSnapshot::default()
        }
    }

    #[test]
    fn native_balance_uses_ticker() {
        let mut snap = snapshot(Asset::native(None));
        let screen = SendConfirm::mount(&snap).unwrap();
        assert_eq!(screen.from_account_balance(), "3.14159 ETH");

        snap.ticker = Some("RINKEBY".into());
        let screen = SendConfirm::mount(&snap).unwrap();
        assert_eq!(screen.from_account_balance(), "3.14159 RINKEBY");
    }

    #[test]
    fn token_balance_uses_symbol_and_decimals() {
        let screen = SendConfirm::mount(&snapshot(Asset::token(DAI, "DAI", 18))).unwrap();
        assert_eq!(screen.from_account_balance(), "42 DAI");
    }

    #[test]
    fn missing_token_balance_is_zero() {
        let other = "0x0000000000000000000000000000000000000abc";
        let screen = SendConfirm::mount(&snapshot(Asset::token(other, "XYZ", 6))).unwrap();
        assert_eq!(screen.from_account_balance(), "0 XYZ");
    }

    #[test]
    fn balance_is_fixed_at_mount() {
        let mut snap = snapshot(Asset::native(None));
        let screen = SendConfirm::mount(&snap).unwrap();
        snap.accounts.clear();
        assert_eq!(screen.summary().from_balance, "3.14159 ETH");
    }

    #[test]
    fn summary_fields() {
        let screen = SendConfirm::mount(&snapshot(Asset::native(None))).unwrap();
        let summary = screen.summary();
        assert_eq!(summary.from, FROM);
        assert_eq!(summary.from_name.as_deref(), Some("Account 1"));
        assert_eq!(summary.to.as_deref(), Some(TO));
        assert_eq!(summary.to_name.as_deref(), Some("Bob"));
        assert_eq!(summary.amount.as_deref(), Some("0.1"));

        let labels: Vec<_> = summary.breakdown.iter().map(|r| r.label).collect();
        assert_eq!(labels, ["Amount", "Transaction fee", "Total amount"]);
        assert!(summary.breakdown[2].emphasized);
    }

    #[test]
    fn mount_errors() {
        let mut snap = snapshot(Asset::native(None));
        snap.accounts.clear();
        assert!(matches!(
            SendConfirm::mount(&snap),
            Err(ConfirmError::UnknownAccount(addr)) if addr == FROM
        ));

        snap.new_transaction = None;
        assert!(matches!(SendConfirm::mount(&snap), Err(ConfirmError::NoDraft)));
    }

    #[test]
    fn unmount_is_tracked() {
        let screen = SendConfirm::mount(&snapshot(Asset::native(None))).unwrap();
        assert!(screen.is_mounted());
        screen.unmount();
        assert!(!screen.is_mounted());
    }
}
