//! # Wallet Constants
//!
//! Every label, storage key and route name the screens agree on lives here.
//! The keychain label and the onboarding flag key are read back by code
//! outside this crate (app bootstrap, biometric unlock), so renaming them is
//! a migration, not a refactor.

// ---------------------------------------------------------------------------
// Credential Capture
// ---------------------------------------------------------------------------

/// Minimum password length accepted by the create-wallet screen.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Account label under which the wallet password is stored in the keychain.
pub const KEYCHAIN_ACCOUNT_LABEL: &str = "nova-wallet-user";

/// Durable flag marking that onboarding finished. Bootstrap reads it to skip
/// the create-password screen on the next launch.
pub const EXISTING_USER_FLAG: &str = "@NovaWallet:existingUser";

/// Value written to [`EXISTING_USER_FLAG`].
pub const EXISTING_USER_VALUE: &str = "true";

/// Error text platform keychains report when no device passcode is set.
pub const PASSCODE_NOT_SET_SENTINEL: &str = "Error: Passcode not set.";

/// User-facing copy for the create-wallet screen.
pub mod messages {
    pub const ERROR_TITLE: &str = "Error";
    pub const PASSWORD_TOO_SHORT: &str = "The password needs to be at least 8 chars long";
    pub const PASSWORD_MISMATCH: &str = "Password doesn't match";
    pub const SECURITY_ALERT_TITLE: &str = "Security Alert";
    pub const SECURITY_ALERT_BODY: &str = "In order to proceed, you need to turn Passcode on or any biometrics authentication method supported in your device (FaceID, TouchID or Fingerprint)";
    pub const TOKEN_REMOVED_TITLE: &str = "Token removed";
    pub const TOKEN_REMOVED_DESC: &str = "Token removed from the list";
    pub const REMOVE_TOKEN_TITLE: &str = "Remove token?";
    pub const REMOVE: &str = "Remove";
    pub const CANCEL: &str = "Cancel";
    pub const NO_TOKENS: &str = "You don't have any tokens!";
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Home screen, reached after onboarding.
pub const ROUTE_HOME: &str = "HomeNav";

/// Asset detail screen, reached by tapping a token row.
pub const ROUTE_ASSET: &str = "Asset";

/// Add-asset screen, reached from the token list footer.
pub const ROUTE_ADD_ASSET: &str = "AddAsset";

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Fractional digits shown for crypto amounts.
pub const DISPLAY_DECIMALS: u32 = 5;

/// Decimals of the chain's native unit (wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// Ticker shown when the network provider does not report one.
pub const DEFAULT_TICKER: &str = "ETH";

/// Largest decimals value the formatter accepts. `10^38` is the biggest
/// power of ten that fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

// ---------------------------------------------------------------------------
// Vault Sealing
// ---------------------------------------------------------------------------

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// Salt length for the Argon2id password KDF.
pub const KDF_SALT_LENGTH: usize = 16;

/// Vault blob format version. Bump when the sealed layout changes.
pub const VAULT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_copy_matches_minimum() {
        assert!(messages::PASSWORD_TOO_SHORT.contains(&MIN_PASSWORD_LENGTH.to_string()));
    }

    #[test]
    fn test_max_decimals_fits_u128() {
        assert!(10u128.checked_pow(MAX_DECIMALS as u32).is_some());
        assert!(10u128.checked_pow(MAX_DECIMALS as u32 + 1).is_none());
    }

    #[test]
    fn test_native_decimals_within_bounds() {
        assert!(NATIVE_DECIMALS <= MAX_DECIMALS);
        assert!(DISPLAY_DECIMALS < NATIVE_DECIMALS as u32);
    }
}
