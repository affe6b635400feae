//! # Views: Screen Behavior
//!
//! Each screen is a struct holding its own transient state and a [`Mount`]
//! handle, built from an [`AppSnapshot`] and a set of collaborator traits.
//! Screens never talk to each other.
//!
//! ```text
//! create_wallet.rs - password capture, keychain write, vault creation
//! tokens.rs        - token rows, balance strings, remove-token action sheet
//! confirm.rs       - sender balance snapshot and amount summary
//! ```
//!
//! Navigation and user alerts go out through [`Navigator`] and [`Notifier`].
//! The `Tracing*` implementations log intents for headless runs, the
//! `Recording*` ones keep them in memory for assertions.
//!
//! [`Mount`]: crate::lifecycle::Mount
//! [`AppSnapshot`]: crate::store::AppSnapshot

pub mod confirm;
pub mod create_wallet;
pub mod tokens;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

pub use self::confirm::{ConfirmError, ConfirmSummary, SendConfirm, SummaryRow};
pub use self::create_wallet::{CreateWallet, CreateWalletError, CreateWalletServices, CreateWalletState};
pub use self::tokens::{ActionSheet, TokenElement, TokenList, TokenRow};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// How a route was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
    /// Jump to a route, reusing it if it is already on the stack.
    Navigate,
    /// Push a new instance of the route on top of the stack.
    Push,
}

/// One navigation request issued by a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationIntent {
    pub kind: NavigationKind,
    pub route: String,
    pub params: Value,
}

/// Navigation dispatcher.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str, params: Value);
    fn push(&self, route: &str, params: Value);
}

/// Logs every navigation request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str, params: Value) {
        tracing::info!(route, %params, "navigate");
    }

    fn push(&self, route: &str, params: Value) {
        tracing::info!(route, %params, "push");
    }
}

/// Keeps every navigation request for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    intents: Mutex<Vec<NavigationIntent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intents(&self) -> Vec<NavigationIntent> {
        self.intents.lock().clone()
    }

    fn record(&self, kind: NavigationKind, route: &str, params: Value) {
        self.intents.lock().push(NavigationIntent {
            kind,
            route: route.to_string(),
            params,
        });
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str, params: Value) {
        self.record(NavigationKind::Navigate, route, params);
    }

    fn push(&self, route: &str, params: Value) {
        self.record(NavigationKind::Push, route, params);
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A titled message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// User-facing alert surface.
pub trait Notifier: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Logs every alert at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "alert");
    }
}

/// Keeps every alert for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().push(Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
