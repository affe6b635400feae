//! # Password Sealing
//!
//! AES-256-GCM under a key stretched from the user's password with
//! Argon2id. This is what turns "the password typed on the create-wallet
//! screen" into "a blob that is safe to write to disk".
//!
//! ## Wire format
//!
//! ```text
//! version (1) || m_cost (4, LE) || t_cost (4, LE) || p_cost (4, LE)
//!             || salt (16) || nonce (12) || ciphertext + tag
//! ```
//!
//! KDF parameters travel with the blob so a vault sealed on a phone with
//! light parameters can still be opened after the defaults are raised.
//! Nonces are random per seal; a vault is resealed rarely enough that the
//! 96-bit birthday bound never comes into play.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, KDF_SALT_LENGTH, VAULT_VERSION};

const HEADER_LENGTH: usize = 1 + 4 * 3 + KDF_SALT_LENGTH;

/// Errors that can occur while sealing or opening a blob.
///
/// Wrong password and corrupted ciphertext are deliberately the same error.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong password or corrupted vault")]
    DecryptFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("sealed data too short")]
    CiphertextTooShort,

    #[error("unsupported vault version {0}")]
    UnsupportedVersion(u8),
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost_kib: u32,
    /// Iterations.
    pub t_cost: u32,
    /// Lanes.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

/// Stretches `password` into an AES-256 key.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, EncryptionError> {
    let argon_params = Params::new(
        params.m_cost_kib,
        params.t_cost,
        params.p_cost,
        Some(AES_KEY_LENGTH),
    )
    .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;

    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params)
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypts with a random nonce. Returns `nonce || ciphertext`.
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts `nonce || ciphertext` produced by [`encrypt`].
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Seals `plaintext` under `password`, producing a self-describing blob.
pub fn seal_with_password(
    password: &[u8],
    plaintext: &[u8],
    params: KdfParams,
) -> Result<Vec<u8>, EncryptionError> {
    let mut salt = [0u8; KDF_SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt, params)?;
    let body = encrypt(&key, plaintext)?;

    let mut out = Vec::with_capacity(HEADER_LENGTH + body.len());
    out.push(VAULT_VERSION);
    out.extend_from_slice(&params.m_cost_kib.to_le_bytes());
    out.extend_from_slice(&params.t_cost.to_le_bytes());
    out.extend_from_slice(&params.p_cost.to_le_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Opens a blob produced by [`seal_with_password`].
pub fn open_with_password(password: &[u8], sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < HEADER_LENGTH + AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }
    if sealed[0] != VAULT_VERSION {
        return Err(EncryptionError::UnsupportedVersion(sealed[0]));
    }

    let read_u32 = |at: usize| {
        let mut word = [0u8; 4];
        word.copy_from_slice(&sealed[at..at + 4]);
        u32::from_le_bytes(word)
    };
    let params = KdfParams {
        m_cost_kib: read_u32(1),
        t_cost: read_u32(5),
        p_cost: read_u32(9),
    };
    let salt = &sealed[13..HEADER_LENGTH];

    let key = derive_key(password, salt, params)?;
    decrypt(&key, &sealed[HEADER_LENGTH..])
}
