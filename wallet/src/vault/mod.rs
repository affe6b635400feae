//! # Vault Module: Password-Sealed Keyring
//!
//! The create-wallet screen hands the user's password to a key-management
//! engine and expects a fresh vault back. This module is that seam
//! ([`KeyringController`]) plus a local engine ([`LocalKeyring`]) that keeps
//! the sealed keyring in [`WalletDb`](crate::store::WalletDb).
//!
//! ```text
//! mod.rs        - KeyringController trait, VaultError
//! encryption.rs - Argon2id key stretching + AES-256-GCM sealing
//! keyring.rs    - LocalKeyring: account generation, seal, unlock
//! ```

pub mod encryption;
pub mod keyring;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::DbError;

pub use self::encryption::{EncryptionError, KdfParams};
pub use self::keyring::{address_for, LocalKeyring};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by key-management operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error("vault storage error: {0}")]
    Storage(#[from] DbError),

    #[error("keyring serialization failed: {0}")]
    Serialization(String),

    /// `submit_password` was called before any vault was created.
    #[error("no vault has been created yet")]
    NoVault,

    /// The vault decrypted but its contents are inconsistent.
    #[error("vault is corrupted: {0}")]
    Corrupted(String),

    #[error("key derivation task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// KeyringController
// ---------------------------------------------------------------------------

/// Key-management engine driven by the onboarding and unlock flows.
#[async_trait]
pub trait KeyringController: Send + Sync {
    /// Creates a brand-new vault sealed with `password`, replacing any
    /// existing one. Returns the addresses of the generated accounts.
    async fn create_new_vault_and_keychain(&self, password: &str)
        -> Result<Vec<String>, VaultError>;

    /// Unlocks the stored vault. Returns its account addresses.
    async fn submit_password(&self, password: &str) -> Result<Vec<String>, VaultError>;
}
