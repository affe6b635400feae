//! # Token List
//!
//! Renders one row per tracked token and handles the row gestures: tap opens
//! the asset screen, long-press offers to remove the token.
//!
//! Row balances are recomputed from the latest snapshot every time they are
//! asked for. Nothing computed here is written back anywhere.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{Navigator, Notifier};
use crate::assets::{addresses_match, Asset, AssetError, AssetRegistry};
use crate::config::{messages, ROUTE_ADD_ASSET, ROUTE_ASSET};
use crate::lifecycle::Mount;
use crate::store::AppSnapshot;
use crate::units::{
    balance_to_fiat, render_from_token_minimal_unit, to_display_amount, DisplayBalances,
    PrimaryCurrency, TokenAmount, UnitsError,
};

/// Exchange rate of the native unit against itself.
const NATIVE_EXCHANGE_RATE: f64 = 1.0;

// ---------------------------------------------------------------------------
// TokenElement
// ---------------------------------------------------------------------------

/// Inputs of a single balance row.
#[derive(Clone, Debug)]
pub struct TokenElement<'a> {
    pub asset: &'a Asset,
    /// Balance in minimal units. Missing balances render as zero.
    pub balance: Option<TokenAmount>,
    /// Token → native unit. Ignored for the native unit itself.
    pub exchange_rate: Option<f64>,
    /// Native unit → display currency.
    pub conversion_rate: f64,
    pub current_currency: &'a str,
    pub primary_currency: PrimaryCurrency,
}

/// A computed row, ready to display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenRow {
    /// List key; `0x` for the native unit.
    pub key: String,
    /// The asset with `balance` and `balance_fiat` filled in.
    pub asset: Asset,
    #[serde(flatten)]
    pub balances: DisplayBalances,
}

impl<'a> TokenElement<'a> {
    /// Pulls the row inputs for `asset` out of `snapshot`.
    pub fn from_snapshot(asset: &'a Asset, snapshot: &'a AppSnapshot) -> Self {
        let (balance, exchange_rate) = if asset.is_native {
            (snapshot.selected_balance(), None)
        } else {
            (
                snapshot.contract_balance(&asset.address),
                snapshot.exchange_rate(&asset.address),
            )
        };
        Self {
            asset,
            balance,
            exchange_rate,
            conversion_rate: snapshot.conversion_rate,
            current_currency: &snapshot.current_currency,
            primary_currency: snapshot.primary_currency,
        }
    }

    fn effective_exchange_rate(&self) -> Option<f64> {
        if self.asset.is_native {
            Some(NATIVE_EXCHANGE_RATE)
        } else {
            self.exchange_rate
        }
    }

    /// Computes the crypto and fiat strings and orders them.
    pub fn compute(&self) -> Result<TokenRow, UnitsError> {
        let raw = self.balance.unwrap_or(TokenAmount::ZERO).get();

        let crypto = match &self.asset.balance {
            Some(rendered) => rendered.clone(),
            None => render_from_token_minimal_unit(raw, self.asset.decimals)?,
        };

        let fiat = match &self.asset.balance_fiat {
            Some(rendered) => Some(rendered.clone()),
            None => {
                // A pre-rendered crypto balance is the only amount we have
                // when no raw balance was supplied.
                let amount = match (&self.asset.balance, self.balance) {
                    (Some(rendered), None) => rendered.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let amount = match amount {
                    Some(amount) => amount,
                    None => to_display_amount(raw, self.asset.decimals)?,
                };
                balance_to_fiat(
                    amount,
                    self.conversion_rate,
                    self.effective_exchange_rate(),
                    self.current_currency,
                )
            }
        };

        let balances = DisplayBalances::arrange(
            format!("{} {}", crypto, self.asset.symbol),
            fiat.clone(),
            self.primary_currency,
        );
        tracing::debug!(symbol = %self.asset.symbol, main = %balances.main, "token row computed");

        Ok(TokenRow {
            key: self.asset.key().to_string(),
            asset: Asset {
                balance: Some(crypto),
                balance_fiat: fiat,
                ..self.asset.clone()
            },
            balances,
        })
    }
}

// ---------------------------------------------------------------------------
// TokenList
// ---------------------------------------------------------------------------

/// The long-press confirmation menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionSheet {
    pub title: &'static str,
    pub options: [&'static str; 2],
    pub cancel_button_index: usize,
    pub destructive_button_index: usize,
}

impl ActionSheet {
    const REMOVE_INDEX: usize = 0;

    fn remove_token() -> Self {
        Self {
            title: messages::REMOVE_TOKEN_TITLE,
            options: [messages::REMOVE, messages::CANCEL],
            cancel_button_index: 1,
            destructive_button_index: Self::REMOVE_INDEX,
        }
    }
}

/// The token list screen.
pub struct TokenList {
    snapshot: RwLock<Arc<AppSnapshot>>,
    registry: Arc<dyn AssetRegistry>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    token_to_remove: Mutex<Option<Asset>>,
    mount: Mount,
}

impl TokenList {
    pub fn mount(
        snapshot: Arc<AppSnapshot>,
        registry: Arc<dyn AssetRegistry>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            registry,
            navigator,
            notifier,
            token_to_remove: Mutex::new(None),
            mount: Mount::new(),
        }
    }

    /// Replaces the snapshot rows are computed from.
    pub fn update_snapshot(&self, snapshot: Arc<AppSnapshot>) {
        *self.snapshot.write() = snapshot;
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.read().tokens.is_empty()
    }

    /// Text of the empty state.
    pub fn empty_message(&self) -> &'static str {
        messages::NO_TOKENS
    }

    /// Computes every row from the current snapshot.
    pub fn rows(&self) -> Result<Vec<TokenRow>, UnitsError> {
        let snapshot = self.snapshot.read().clone();
        snapshot
            .tokens
            .iter()
            .map(|asset| TokenElement::from_snapshot(asset, &snapshot).compute())
            .collect()
    }

    /// Opens the asset screen for a tapped row.
    pub fn on_item_press(&self, row: &TokenRow) {
        let mut params = serde_json::to_value(&row.asset).unwrap_or(Value::Null);
        if let Value::Object(fields) = &mut params {
            let transactions = self.snapshot.read().transactions.clone();
            fields.insert("transactions".to_string(), Value::Array(transactions));
        }
        self.navigator.navigate(ROUTE_ASSET, params);
    }

    /// Footer action: opens the add-token screen.
    pub fn go_to_add_token(&self) {
        self.navigator
            .push(ROUTE_ADD_ASSET, json!({ "assetType": "token" }));
    }

    /// Long-press: remembers the token and returns the menu to show.
    pub fn show_remove_menu(&self, asset: &Asset) -> ActionSheet {
        if self.mount.is_mounted() {
            *self.token_to_remove.lock() = Some(asset.clone());
        }
        ActionSheet::remove_token()
    }

    /// The token waiting for a menu answer.
    pub fn token_to_remove(&self) -> Option<Asset> {
        self.token_to_remove.lock().clone()
    }

    /// Handles the menu answer. Returns `true` when a token was removed.
    pub async fn on_action_sheet_press(&self, index: usize) -> Result<bool, AssetError> {
        if index != ActionSheet::REMOVE_INDEX {
            return Ok(false);
        }

        let Some(asset) = self.token_to_remove.lock().clone() else {
            tracing::warn!("remove pressed with no token selected");
            return Ok(false);
        };

        if let Err(err) = self.registry.remove_and_ignore_token(&asset.address).await {
            tracing::warn!(symbol = %asset.symbol, error = %err, "token removal failed");
            return Err(err);
        }
        // Only clear the selection if it still names the removed token.
        {
            let mut selected = self.token_to_remove.lock();
            if selected
                .as_ref()
                .is_some_and(|s| addresses_match(&s.address, &asset.address))
            {
                *selected = None;
            }
        }
        self.notifier
            .alert(messages::TOKEN_REMOVED_TITLE, messages::TOKEN_REMOVED_DESC);
        tracing::info!(symbol = %asset.symbol, "token removed from list");
        Ok(true)
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AccountInfo, DbError};
    use crate::views::{NavigationKind, RecordingNavigator, RecordingNotifier};
    use async_trait::async_trait;
    use std::collections::HashMap;

    const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    #[derive(Default)]
    struct CountingRegistry {
        removed: Mutex<Vec<String>>,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl AssetRegistry for CountingRegistry {
        async fn add_token(&self, _asset: Asset) -> Result<(), AssetError> {
            Ok(())
        }

        async fn remove_and_ignore_token(&self, address: &str) -> Result<(), AssetError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(AssetError::Storage(DbError::Serialization("disk full".into())));
            }
            self.removed.lock().push(address.to_string());
            Ok(())
        }

        async fn tokens(&self) -> Result<Vec<Asset>, AssetError> {
            Ok(Vec::new())
        }

        async fn ignored_tokens(&self) -> Result<Vec<String>, AssetError> {
            Ok(self.removed.lock().clone())
        }
    }

    fn element(asset: &Asset, balance: u128, primary: PrimaryCurrency) -> TokenElement<'_> {
        TokenElement {
            asset,
            balance: Some(TokenAmount::new(balance)),
            exchange_rate: None,
            conversion_rate: 2000.0,
            current_currency: "usd",
            primary_currency: primary,
        }
    }

    #[test]
    fn native_row_uses_conversion_rate() {
        let eth = Asset::native(None);
        let row = element(&eth, 1_500_000_000_000_000_000, PrimaryCurrency::Native)
            .compute()
            .unwrap();
        assert_eq!(row.balances.main, "1.5 ETH");
        assert_eq!(row.balances.secondary.as_deref(), Some("$3000.00"));
        assert_eq!(row.key, "0x");
    }

    #[test]
    fn fiat_primary_swaps_strings() {
        let eth = Asset::native(None);
        let row = element(&eth, 1_500_000_000_000_000_000, PrimaryCurrency::Fiat)
            .compute()
            .unwrap();
        assert_eq!(row.balances.main, "$3000.00");
        assert_eq!(row.balances.secondary.as_deref(), Some("1.5 ETH"));
    }

    #[test]
    fn token_without_rate_has_no_secondary() {
        let dai = Asset::token(DAI, "DAI", 18);
        for primary in [PrimaryCurrency::Native, PrimaryCurrency::Fiat] {
            let row = element(&dai, 2_000_000_000_000_000_000, primary)
                .compute()
                .unwrap();
            assert_eq!(row.balances.main, "2 DAI");
            assert_eq!(row.balances.secondary, None);
        }
    }

    #[test]
    fn token_with_rate_converts() {
        let usdc = Asset::token(USDC, "USDC", 6);
        let mut el = element(&usdc, 10_500_000, PrimaryCurrency::Native);
        el.exchange_rate = Some(0.0005);
        let row = el.compute().unwrap();
        assert_eq!(row.balances.main, "10.5 USDC");
        assert_eq!(row.balances.secondary.as_deref(), Some("$10.50"));
        assert_eq!(row.asset.balance_fiat.as_deref(), Some("$10.50"));
    }

    #[test]
    fn prerendered_strings_win() {
        let mut eth = Asset::native(None);
        eth.balance = Some("0.25".into());
        eth.balance_fiat = Some("$1.00".into());
        let row = element(&eth, 9_000_000_000_000_000_000, PrimaryCurrency::Native)
            .compute()
            .unwrap();
        assert_eq!(row.balances.main, "0.25 ETH");
        assert_eq!(row.balances.secondary.as_deref(), Some("$1.00"));
    }

    #[test]
    fn prerendered_balance_feeds_fiat_when_raw_missing() {
        let mut eth = Asset::native(None);
        eth.balance = Some("0.5".into());
        let mut el = element(&eth, 0, PrimaryCurrency::Native);
        el.balance = None;
        let row = el.compute().unwrap();
        assert_eq!(row.balances.secondary.as_deref(), Some("$1000.00"));
    }

    #[test]
    fn missing_balance_renders_zero() {
        let dai = Asset::token(DAI, "DAI", 18);
        let mut el = element(&dai, 0, PrimaryCurrency::Native);
        el.balance = None;
        assert_eq!(el.compute().unwrap().balances.main, "0 DAI");
    }

    fn snapshot() -> Arc<AppSnapshot> {
        Arc::new(AppSnapshot {
            conversion_rate: 2000.0,
            tokens: vec![Asset::token(DAI, "DAI", 18), Asset::token(USDC, "USDC", 6)],
            contract_balances: HashMap::from([(
                DAI.to_lowercase(),
                TokenAmount::new(1_234_567_000_000_000_000),
            )]),
            contract_exchange_rates: HashMap::from([(DAI.to_string(), 0.0005)]),
            transactions: vec![json!({ "hash": "0xabc" })],
            ..AppSnapshot::default()
        })
    }

    struct Harness {
        list: TokenList,
        registry: Arc<CountingRegistry>,
        nav: Arc<RecordingNavigator>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(snapshot: Arc<AppSnapshot>) -> Harness {
        let registry = Arc::new(CountingRegistry::default());
        let nav = Arc::new(RecordingNavigator::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let list = TokenList::mount(snapshot, registry.clone(), nav.clone(), notifier.clone());
        Harness {
            list,
            registry,
            nav,
            notifier,
        }
    }

    #[test]
    fn rows_from_snapshot() {
        let h = harness(snapshot());
        let rows = h.list.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].balances.main, "1.23457 DAI");
        assert_eq!(rows[0].balances.secondary.as_deref(), Some("$1.23"));
        assert_eq!(rows[1].balances.main, "0 USDC");
        assert_eq!(rows[1].balances.secondary, None);
    }

    #[test]
    fn empty_state() {
        let h = harness(Arc::new(AppSnapshot::default()));
        assert!(h.list.is_empty());
        assert!(h.list.rows().unwrap().is_empty());
        assert_eq!(h.list.empty_message(), messages::NO_TOKENS);
    }

    #[test]
    fn newer_snapshot_supersedes() {
        let h = harness(snapshot());
        let mut next = (*snapshot()).clone();
        next.primary_currency = PrimaryCurrency::Fiat;
        h.list.update_snapshot(Arc::new(next));
        assert_eq!(h.list.rows().unwrap()[0].balances.main, "$1.23");
    }

    #[test]
    fn tapping_row_navigates_with_transactions() {
        let h = harness(snapshot());
        let rows = h.list.rows().unwrap();
        h.list.on_item_press(&rows[0]);

        let intents = h.nav.intents();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].kind, NavigationKind::Navigate);
        assert_eq!(intents[0].route, ROUTE_ASSET);
        assert_eq!(intents[0].params["symbol"], "DAI");
        assert_eq!(intents[0].params["balance"], "1.23457");
        assert_eq!(intents[0].params["transactions"][0]["hash"], "0xabc");
    }

    #[test]
    fn add_token_pushes_add_asset() {
        let h = harness(snapshot());
        h.list.go_to_add_token();
        let intents = h.nav.intents();
        assert_eq!(intents[0].kind, NavigationKind::Push);
        assert_eq!(intents[0].route, ROUTE_ADD_ASSET);
        assert_eq!(intents[0].params, json!({ "assetType": "token" }));
    }

    #[tokio::test]
    async fn remove_calls_registry_once_and_notifies() {
        let h = harness(snapshot());
        let dai = Asset::token(DAI, "DAI", 18);

        let sheet = h.list.show_remove_menu(&dai);
        assert_eq!(sheet.options, ["Remove", "Cancel"]);
        assert_eq!(sheet.cancel_button_index, 1);
        assert_eq!(sheet.destructive_button_index, 0);

        assert!(h.list.on_action_sheet_press(0).await.unwrap());
        assert_eq!(*h.registry.removed.lock(), vec![DAI.to_string()]);

        let alerts = h.notifier.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Token removed");
        assert_eq!(alerts[0].message, "Token removed from the list");

        // Pressing again without a new long-press does nothing.
        assert!(!h.list.on_action_sheet_press(0).await.unwrap());
        assert_eq!(h.registry.removed.lock().len(), 1);
    }

    #[tokio::test]
    async fn cancel_does_nothing() {
        let h = harness(snapshot());
        h.list.show_remove_menu(&Asset::token(USDC, "USDC", 6));
        assert!(!h.list.on_action_sheet_press(1).await.unwrap());
        assert!(h.registry.removed.lock().is_empty());
        assert!(h.notifier.alerts().is_empty());
        assert!(h.list.token_to_remove().is_some());
    }

    #[tokio::test]
    async fn failed_removal_keeps_selection_for_retry() {
        let h = harness(snapshot());
        let dai = Asset::token(DAI, "DAI", 18);
        h.list.show_remove_menu(&dai);

        h.registry.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(h.list.on_action_sheet_press(0).await.is_err());
        assert_eq!(h.list.token_to_remove(), Some(dai));
        assert!(h.notifier.alerts().is_empty());

        h.registry.fail.store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(h.list.on_action_sheet_press(0).await.unwrap());
        assert_eq!(*h.registry.removed.lock(), vec![DAI.to_string()]);
        assert_eq!(h.list.token_to_remove(), None);
        assert_eq!(h.notifier.alerts().len(), 1);
    }

    #[test]
    fn native_row_reads_selected_account_balance() {
        let selected = "0xC4955C0d639D99699Bfd7Ec54d9FaFEe40e4D272";
        let snapshot = Arc::new(AppSnapshot {
            conversion_rate: 2000.0,
            selected_address: Some(selected.to_string()),
            accounts: HashMap::from([(
                selected.to_lowercase(),
                AccountInfo {
                    balance: TokenAmount::new(1_500_000_000_000_000_000),
                },
            )]),
            tokens: vec![Asset::native(None)],
            ..AppSnapshot::default()
        });
        let h = harness(snapshot);
        let rows = h.list.rows().unwrap();
        assert_eq!(rows[0].balances.main, "1.5 ETH");
        assert_eq!(rows[0].balances.secondary.as_deref(), Some("$3000.00"));
    }

    #[tokio::test]
    async fn remove_without_selection_is_noop() {
        let h = harness(snapshot());
        assert!(!h.list.on_action_sheet_press(0).await.unwrap());
        assert!(h.registry.removed.lock().is_empty());
    }
}
