//! sled-backed [`SecureStore`] for desktop runs of the CLI.
//!
//! Stand-in for a platform keychain: entries are written to the wallet
//! database as-is, with no hardware-backed encryption. Use it for
//! development wallets only.

use async_trait::async_trait;

use super::{
    AccessPolicy, BiometryType, Credentials, DeviceSecurity, KeychainError, SecureStore,
    StoredCredential,
};
use crate::store::WalletDb;

/// Keychain persisted in the `keychain` tree of a [`WalletDb`].
#[derive(Debug, Clone)]
pub struct SledKeychain {
    db: WalletDb,
    device: DeviceSecurity,
}

impl SledKeychain {
    pub fn new(db: WalletDb, device: DeviceSecurity) -> Self {
        Self { db, device }
    }
}

#[async_trait]
impl SecureStore for SledKeychain {
    async fn supported_biometry_type(&self) -> Result<Option<BiometryType>, KeychainError> {
        Ok(self.device.biometry)
    }

    async fn set_generic_password(
        &self,
        label: &str,
        secret: &str,
        policy: AccessPolicy,
    ) -> Result<(), KeychainError> {
        self.device.admit(&policy)?;
        let entry = StoredCredential {
            credentials: Credentials {
                username: label.to_string(),
                password: secret.to_string(),
            },
            policy,
        };
        self.db.put_keychain_entry(label, &entry)?;
        tracing::debug!(label, access_control = ?policy.access_control, "credential stored");
        Ok(())
    }

    async fn get_generic_password(
        &self,
        label: &str,
    ) -> Result<Option<Credentials>, KeychainError> {
        Ok(self
            .db
            .get_keychain_entry::<StoredCredential>(label)?
            .map(|entry| entry.credentials))
    }

    async fn reset_generic_password(&self, label: &str) -> Result<bool, KeychainError> {
        Ok(self.db.remove_keychain_entry(label)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet");
        {
            let db = WalletDb::open(&path).unwrap();
            let kc = SledKeychain::new(db, DeviceSecurity::default());
            kc.set_generic_password("user", "persist-me", AccessPolicy::for_wallet_password(false))
                .await
                .unwrap();
        }
        let db = WalletDb::open(&path).unwrap();
        let kc = SledKeychain::new(db, DeviceSecurity::default());
        let creds = kc.get_generic_password("user").await.unwrap().unwrap();
        assert_eq!(creds.password, "persist-me");
    }

    #[tokio::test]
    async fn no_passcode_device_refuses() {
        let db = WalletDb::open_temporary().unwrap();
        let kc = SledKeychain::new(
            db.clone(),
            DeviceSecurity {
                passcode_set: false,
                biometry: Some(BiometryType::Fingerprint),
            },
        );
        let err = kc
            .set_generic_password("user", "whatever1", AccessPolicy::for_wallet_password(true))
            .await
            .unwrap_err();
        assert!(matches!(err, KeychainError::PasscodeNotSet));
        assert!(db
            .get_keychain_entry::<StoredCredential>("user")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn reset_removes_entry() {
        let kc = SledKeychain::new(WalletDb::open_temporary().unwrap(), DeviceSecurity::default());
        kc.set_generic_password("user", "short-lived", AccessPolicy::for_wallet_password(false))
            .await
            .unwrap();
        assert!(kc.reset_generic_password("user").await.unwrap());
        assert!(kc.get_generic_password("user").await.unwrap().is_none());
    }
}
