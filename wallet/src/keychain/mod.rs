//! # Keychain Module: Secure Credential Storage
//!
//! The wallet password is handed to the platform keychain under a fixed
//! account label so the app can later unlock with a passcode or biometric
//! prompt instead of asking for the password again.
//!
//! ```text
//! mod.rs    - SecureStore trait, access policies, errors
//! memory.rs - in-process store with a simulated device
//! disk.rs   - sled-backed store for the CLI, same device model
//! ```
//!
//! Platform keychains report "no passcode configured" as a bare error string.
//! [`KeychainError::from_platform`] is the single place that string is
//! recognized; everything downstream matches on
//! [`KeychainError::PasscodeNotSet`].

pub mod disk;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::PASSCODE_NOT_SET_SENTINEL;
use crate::store::DbError;

pub use self::disk::SledKeychain;
pub use self::memory::MemoryKeychain;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by a secure credential store.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// The device has neither a passcode nor enrolled biometrics.
    #[error("{PASSCODE_NOT_SET_SENTINEL}")]
    PasscodeNotSet,

    /// Any other platform failure, carrying the platform's message verbatim.
    #[error("{0}")]
    Platform(String),

    #[error("keychain storage error: {0}")]
    Storage(#[from] DbError),
}

impl KeychainError {
    /// Classifies a raw platform error message.
    pub fn from_platform(message: &str) -> Self {
        if message.trim() == PASSCODE_NOT_SET_SENTINEL {
            KeychainError::PasscodeNotSet
        } else {
            KeychainError::Platform(message.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Biometric sensor available on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiometryType {
    FaceId,
    TouchId,
    Fingerprint,
    Iris,
}

impl fmt::Display for BiometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FaceId => write!(f, "FaceID"),
            Self::TouchId => write!(f, "TouchID"),
            Self::Fingerprint => write!(f, "Fingerprint"),
            Self::Iris => write!(f, "Iris"),
        }
    }
}

impl std::str::FromStr for BiometryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "faceid" | "face" => Ok(Self::FaceId),
            "touchid" | "touch" => Ok(Self::TouchId),
            "fingerprint" => Ok(Self::Fingerprint),
            "iris" => Ok(Self::Iris),
            other => Err(format!("unknown biometry type: {other}")),
        }
    }
}

/// Who may read the stored item back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessControl {
    /// Device passcode only.
    DevicePasscode,
    /// Currently enrolled biometrics, falling back to the device passcode.
    BiometryCurrentSetOrDevicePasscode,
}

/// When the item is readable relative to the device lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accessible {
    WhenUnlocked,
}

/// Prompt shown when the item is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationType {
    DevicePasscodeOrBiometrics,
}

/// Full access policy attached to a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub access_control: AccessControl,
    pub accessible: Accessible,
    pub authentication_type: AuthenticationType,
}

impl AccessPolicy {
    /// Policy for the wallet password: biometrics-or-passcode when the user
    /// opted into biometrics, passcode only otherwise.
    pub fn for_wallet_password(biometry_choice: bool) -> Self {
        Self {
            access_control: if biometry_choice {
                AccessControl::BiometryCurrentSetOrDevicePasscode
            } else {
                AccessControl::DevicePasscode
            },
            accessible: Accessible::WhenUnlocked,
            authentication_type: AuthenticationType::DevicePasscodeOrBiometrics,
        }
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Security configuration of the (real or simulated) device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSecurity {
    /// Whether a device passcode is configured.
    pub passcode_set: bool,
    /// Enrolled biometric sensor, if any.
    pub biometry: Option<BiometryType>,
}

impl Default for DeviceSecurity {
    fn default() -> Self {
        Self {
            passcode_set: true,
            biometry: None,
        }
    }
}

impl DeviceSecurity {
    /// Checks whether an item with `policy` can be stored on this device.
    ///
    /// Both access-control modes ultimately fall back to the passcode, so
    /// a device without one can store neither.
    pub fn admit(&self, policy: &AccessPolicy) -> Result<(), KeychainError> {
        if self.passcode_set {
            return Ok(());
        }
        tracing::debug!(access_control = ?policy.access_control, "device has no passcode");
        Err(KeychainError::from_platform(PASSCODE_NOT_SET_SENTINEL))
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A stored username/password pair. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What a store persists per label.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredCredential {
    pub credentials: Credentials,
    pub policy: AccessPolicy,
}

// ---------------------------------------------------------------------------
// SecureStore
// ---------------------------------------------------------------------------

/// Platform credential storage gated by device authentication.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Biometric sensor the device offers, if any.
    async fn supported_biometry_type(&self) -> Result<Option<BiometryType>, KeychainError>;

    /// Stores `secret` under `label`, replacing any previous entry.
    async fn set_generic_password(
        &self,
        label: &str,
        secret: &str,
        policy: AccessPolicy,
    ) -> Result<(), KeychainError>;

    /// Reads the entry under `label`.
    async fn get_generic_password(&self, label: &str)
        -> Result<Option<Credentials>, KeychainError>;

    /// Deletes the entry under `label`. Returns `true` if one existed.
    async fn reset_generic_password(&self, label: &str) -> Result<bool, KeychainError>;
}
