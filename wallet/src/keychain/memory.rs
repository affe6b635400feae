//! In-process [`SecureStore`] with a simulated device.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{
    AccessPolicy, BiometryType, Credentials, DeviceSecurity, KeychainError, SecureStore,
    StoredCredential,
};

/// Keychain that lives in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryKeychain {
    device: DeviceSecurity,
    entries: DashMap<String, StoredCredential>,
}

impl MemoryKeychain {
    /// A keychain on a device with a passcode and no biometrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A keychain on a device configured as `device`.
    pub fn with_device(device: DeviceSecurity) -> Self {
        Self {
            device,
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Policy the entry under `label` was stored with.
    pub fn policy_for(&self, label: &str) -> Option<AccessPolicy> {
        self.entries.get(label).map(|entry| entry.policy)
    }
}

#[async_trait]
impl SecureStore for MemoryKeychain {
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
        self.entries.insert(
            label.to_string(),
            StoredCredential {
                credentials: Credentials {
                    username: label.to_string(),
                    password: secret.to_string(),
                },
                policy,
            },
        );
        Ok(())
    }

    async fn get_generic_password(
        &self,
        label: &str,
    ) -> Result<Option<Credentials>, KeychainError> {
        Ok(self
            .entries
            .get(label)
            .map(|entry| entry.credentials.clone()))
    }

    async fn reset_generic_password(&self, label: &str) -> Result<bool, KeychainError> {
        Ok(self.entries.remove(label).is_some())
    }
}
