//! # Create Wallet
//!
//! Password capture for a new wallet. A valid submission runs four
//! external steps in order:
//!
//! 1. store the password in the secure store under the wallet account label,
//! 2. create a new vault sealed with it,
//! 3. set the existing-user flag,
//! 4. navigate home.
//!
//! Each step runs only if the previous one succeeded. If vault creation
//! fails, the stored password is reset so the keychain never holds a
//! password for a vault that does not exist.
//!
//! The view may be unmounted while a step is in flight. Steps already
//! submitted keep going; the view's own state is left alone.

use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{Navigator, Notifier};
use crate::config::{
    messages, EXISTING_USER_FLAG, EXISTING_USER_VALUE, KEYCHAIN_ACCOUNT_LABEL,
    MIN_PASSWORD_LENGTH, ROUTE_HOME,
};
use crate::keychain::{AccessPolicy, BiometryType, KeychainError, SecureStore};
use crate::lifecycle::{Liveness, Mount};
use crate::store::{DbError, FlagStore};
use crate::vault::{KeyringController, VaultError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum CreateWalletError {
    #[error("{}", messages::PASSWORD_TOO_SHORT)]
    PasswordTooShort,

    #[error("{}", messages::PASSWORD_MISMATCH)]
    PasswordMismatch,

    /// A previous submission is still running.
    #[error("wallet creation already in progress")]
    InProgress,

    /// The device has no passcode or biometrics configured.
    #[error("{}", messages::SECURITY_ALERT_BODY)]
    PasscodeNotSet,

    #[error(transparent)]
    Keychain(KeychainError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Flags(#[from] DbError),
}

impl From<KeychainError> for CreateWalletError {
    fn from(err: KeychainError) -> Self {
        match err {
            KeychainError::PasscodeNotSet => CreateWalletError::PasscodeNotSet,
            other => CreateWalletError::Keychain(other),
        }
    }
}

impl CreateWalletError {
    /// `true` for errors caught before any external call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::PasswordTooShort | Self::PasswordMismatch)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The two password fields. Wiped when cleared or dropped.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
struct CredentialDraft {
    password: String,
    confirm_password: String,
}

impl fmt::Debug for CredentialDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDraft")
            .field("password_len", &self.password.len())
            .field("confirm_password_len", &self.confirm_password.len())
            .finish()
    }
}

/// Everything the screen renders besides the password fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateWalletState {
    pub biometry_type: Option<BiometryType>,
    pub biometry_choice: bool,
    /// Spinner on the create button.
    pub loading: bool,
    /// Inline error text under the form.
    pub error: Option<String>,
}

/// External collaborators of the screen.
#[derive(Clone)]
pub struct CreateWalletServices {
    pub keychain: Arc<dyn SecureStore>,
    pub keyring: Arc<dyn KeyringController>,
    pub flags: Arc<dyn FlagStore>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Password length in UTF-16 code units, as the app's text inputs count it.
fn password_length(password: &str) -> usize {
    password.encode_utf16().count()
}

fn validate(password: &str, confirm_password: &str) -> Result<(), CreateWalletError> {
    if password_length(password) < MIN_PASSWORD_LENGTH {
        return Err(CreateWalletError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(CreateWalletError::PasswordMismatch);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CreateWallet
// ---------------------------------------------------------------------------

/// The create-wallet screen.
pub struct CreateWallet {
    services: CreateWalletServices,
    draft: Mutex<CredentialDraft>,
    state: Mutex<CreateWalletState>,
    mount: Mount,
}

impl CreateWallet {
    pub fn mount(services: CreateWalletServices) -> Self {
        Self {
            services,
            draft: Mutex::new(CredentialDraft::default()),
            state: Mutex::new(CreateWalletState::default()),
            mount: Mount::new(),
        }
    }

    pub fn on_password_change(&self, value: &str) {
        let mut draft = self.draft.lock();
        draft.password.zeroize();
        draft.password.push_str(value);
    }

    pub fn on_confirm_password_change(&self, value: &str) {
        let mut draft = self.draft.lock();
        draft.confirm_password.zeroize();
        draft.confirm_password.push_str(value);
    }

    /// `true` while either password field has content.
    pub fn has_draft(&self) -> bool {
        let draft = self.draft.lock();
        !draft.password.is_empty() || !draft.confirm_password.is_empty()
    }

    pub fn state(&self) -> CreateWalletState {
        self.state.lock().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    /// Leaves the screen. The draft is wiped right away.
    pub fn unmount(&self) {
        self.mount.unmount();
        self.draft.lock().zeroize();
    }

    /// Handles the create button.
    ///
    /// Validation problems and a missing device passcode are shown as
    /// alerts; every other failure lands in [`CreateWalletState::error`].
    /// Returns the new vault's accounts on success.
    pub async fn on_press_create(&self) -> Result<Vec<String>, CreateWalletError> {
        let live = self.mount.liveness();

        let (password, confirm_password) = {
            let draft = self.draft.lock();
            (
                Zeroizing::new(draft.password.clone()),
                Zeroizing::new(draft.confirm_password.clone()),
            )
        };

        if let Err(err) = validate(&password, &confirm_password) {
            self.services
                .notifier
                .alert(messages::ERROR_TITLE, &err.to_string());
            return Err(err);
        }

        {
            let mut state = self.state.lock();
            if state.loading {
                tracing::debug!("create pressed while a submission is running");
                return Err(CreateWalletError::InProgress);
            }
            state.loading = true;
            state.error = None;
        }

        match self.submit(&password, &live).await {
            Ok(accounts) => {
                live.guard(|| {
                    self.state.lock().loading = false;
                    self.draft.lock().zeroize();
                });
                tracing::info!(accounts = accounts.len(), "wallet created");
                Ok(accounts)
            }
            Err(CreateWalletError::PasscodeNotSet) => {
                self.services
                    .notifier
                    .alert(messages::SECURITY_ALERT_TITLE, messages::SECURITY_ALERT_BODY);
                live.guard(|| self.state.lock().loading = false);
                Err(CreateWalletError::PasscodeNotSet)
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet creation failed");
                live.guard(|| {
                    let mut state = self.state.lock();
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    async fn submit(&self, password: &str, live: &Liveness) -> Result<Vec<String>, CreateWalletError> {
        let services = &self.services;

        let biometry = services.keychain.supported_biometry_type().await?;
        if let Some(kind) = biometry {
            live.guard(|| {
                let mut state = self.state.lock();
                state.biometry_type = Some(kind);
                state.biometry_choice = true;
            });
        }
        let policy = AccessPolicy::for_wallet_password(biometry.is_some());

        services
            .keychain
            .set_generic_password(KEYCHAIN_ACCOUNT_LABEL, password, policy)
            .await?;

        let accounts = match services.keyring.create_new_vault_and_keychain(password).await {
            Ok(accounts) => accounts,
            Err(err) => {
                self.roll_back_credential().await;
                return Err(err.into());
            }
        };

        services
            .flags
            .set_item(EXISTING_USER_FLAG, EXISTING_USER_VALUE)
            .await?;
        services.navigator.navigate(ROUTE_HOME, Value::Null);
        Ok(accounts)
    }

    async fn roll_back_credential(&self) {
        match self
            .services
            .keychain
            .reset_generic_password(KEYCHAIN_ACCOUNT_LABEL)
            .await
        {
            Ok(_) => tracing::debug!("stored credential reset after vault failure"),
            Err(err) => tracing::warn!(error = %err, "could not reset stored credential"),
        }
    }
}
