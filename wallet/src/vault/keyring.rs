//! Local keyring: one Ed25519 account, sealed under the wallet password.
//!
//! Account addresses are `0x` followed by the last 20 bytes of
//! `blake3(public_key)`, which keeps them in the same 20-byte hex shape the
//! rest of the wallet validates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ed25519_dalek::{SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::encryption::{open_with_password, seal_with_password, KdfParams};
use super::{KeyringController, VaultError};
use crate::store::WalletDb;

/// Derives the wallet address of an Ed25519 public key.
pub fn address_for(key: &VerifyingKey) -> String {
    let digest = blake3::hash(key.as_bytes());
    format!("0x{}", hex::encode(&digest.as_bytes()[12..]))
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct AccountRecord {
    address: String,
    secret_key: String,
}

#[derive(Serialize, Deserialize)]
struct KeyringPayload {
    created_at: DateTime<Utc>,
    accounts: Vec<AccountRecord>,
}

impl KeyringPayload {
    fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let record = AccountRecord {
            address: address_for(&signing_key.verifying_key()),
            secret_key: hex::encode(signing_key.to_bytes()),
        };
        Self {
            created_at: Utc::now(),
            accounts: vec![record],
        }
    }

    fn addresses(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.address.clone()).collect()
    }

    /// Re-derives every address from its secret key.
    fn verify(&self) -> Result<(), VaultError> {
        for record in &self.accounts {
            let bytes = Zeroizing::new(
                hex::decode(&record.secret_key)
                    .map_err(|e| VaultError::Corrupted(e.to_string()))?,
            );
            let secret: [u8; SECRET_KEY_LENGTH] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| VaultError::Corrupted("secret key has wrong length".into()))?;
            let derived = address_for(&SigningKey::from_bytes(&secret).verifying_key());
            if derived != record.address {
                return Err(VaultError::Corrupted(format!(
                    "address {} does not match its key",
                    record.address
                )));
            }
        }
        Ok(())
    }
}

/// [`KeyringController`] storing its sealed vault in a [`WalletDb`].
///
/// After a successful create or unlock the account list is cached so the
/// CLI can report it without decrypting again.
#[derive(Debug, Clone)]
pub struct LocalKeyring {
    db: WalletDb,
    kdf: KdfParams,
    unlocked: Arc<RwLock<Option<Vec<String>>>>,
}

impl LocalKeyring {
    pub fn new(db: WalletDb) -> Self {
        Self::with_kdf_params(db, KdfParams::default())
    }

    /// Uses non-default Argon2 costs for newly sealed vaults.
    pub fn with_kdf_params(db: WalletDb, kdf: KdfParams) -> Self {
        Self {
            db,
            kdf,
            unlocked: Arc::new(RwLock::new(None)),
        }
    }

    /// Accounts of the unlocked vault, if any.
    pub fn accounts(&self) -> Option<Vec<String>> {
        self.unlocked.read().clone()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.read().is_some()
    }

    /// Forgets the unlocked account list.
    pub fn lock(&self) {
        *self.unlocked.write() = None;
    }
}

#[async_trait]
impl KeyringController for LocalKeyring {
    async fn create_new_vault_and_keychain(
        &self,
        password: &str,
    ) -> Result<Vec<String>, VaultError> {
        if self.db.has_vault()? {
            tracing::warn!("replacing existing vault");
        }

        let payload = KeyringPayload::generate();
        let accounts = payload.addresses();
        let plaintext = Zeroizing::new(
            serde_json::to_vec(&payload).map_err(|e| VaultError::Serialization(e.to_string()))?,
        );
        drop(payload);

        let password = Zeroizing::new(password.to_owned());
        let kdf = self.kdf;
        let sealed = tokio::task::spawn_blocking(move || {
            seal_with_password(password.as_bytes(), &plaintext, kdf)
        })
        .await
        .map_err(|e| VaultError::Task(e.to_string()))??;

        self.db.put_vault(&sealed)?;
        *self.unlocked.write() = Some(accounts.clone());
        tracing::info!(accounts = accounts.len(), "vault created");
        Ok(accounts)
    }

    async fn submit_password(&self, password: &str) -> Result<Vec<String>, VaultError> {
        let sealed = self.db.get_vault()?.ok_or(VaultError::NoVault)?;

        let password = Zeroizing::new(password.to_owned());
        let plaintext = tokio::task::spawn_blocking(move || {
            open_with_password(password.as_bytes(), &sealed).map(Zeroizing::new)
        })
        .await
        .map_err(|e| VaultError::Task(e.to_string()))??;

        let payload: KeyringPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::Corrupted(e.to_string()))?;
        payload.verify()?;

        let accounts = payload.addresses();
        *self.unlocked.write() = Some(accounts.clone());
        tracing::info!(accounts = accounts.len(), created_at = %payload.created_at, "vault unlocked");
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::is_valid_address;
    use crate::vault::EncryptionError;

    fn keyring() -> LocalKeyring {
        LocalKeyring::with_kdf_params(
            WalletDb::open_temporary().unwrap(),
            KdfParams {
                m_cost_kib: 64,
                t_cost: 1,
                p_cost: 1,
            },
        )
    }

    #[test]
    fn addresses_are_twenty_byte_hex() {
        let key = SigningKey::generate(&mut OsRng);
        let address = address_for(&key.verifying_key());
        assert!(is_valid_address(&address));
        assert_eq!(address, address_for(&key.verifying_key()));
    }

    #[tokio::test]
    async fn create_then_unlock() {
        let kr = keyring();
        let created = kr.create_new_vault_and_keychain("password123").await.unwrap();
        assert_eq!(created.len(), 1);

        kr.lock();
        assert!(!kr.is_unlocked());

        let unlocked = kr.submit_password("password123").await.unwrap();
        assert_eq!(created, unlocked);
        assert_eq!(kr.accounts(), Some(unlocked));
    }

    #[tokio::test]
    async fn wrong_password_does_not_unlock() {
        let kr = keyring();
        kr.create_new_vault_and_keychain("password123").await.unwrap();
        kr.lock();

        let err = kr.submit_password("password321").await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Encryption(EncryptionError::DecryptFailed)
        ));
        assert!(!kr.is_unlocked());
    }

    #[tokio::test]
    async fn unlock_without_vault() {
        let kr = keyring();
        assert!(matches!(
            kr.submit_password("password123").await,
            Err(VaultError::NoVault)
        ));
    }

    #[tokio::test]
    async fn recreate_replaces_accounts() {
        let kr = keyring();
        let first = kr.create_new_vault_and_keychain("password123").await.unwrap();
        let second = kr.create_new_vault_and_keychain("another-pass").await.unwrap();
        assert_ne!(first, second);
        assert!(kr.submit_password("password123").await.is_err());
        assert_eq!(kr.submit_password("another-pass").await.unwrap(), second);
    }

    #[test]
    fn tampered_address_is_detected() {
        let mut payload = KeyringPayload::generate();
        payload.accounts[0].address = "0x0000000000000000000000000000000000000000".into();
        assert!(matches!(payload.verify(), Err(VaultError::Corrupted(_))));
    }
}
