//! # Token Registry
//!
//! The [`AssetRegistry`] trait is the seam between the token list screen and
//! whatever engine tracks tokens. [`TokenRegistry`] is the local
//! implementation, persisted in [`WalletDb`].
//!
//! Removing a token also ignores it, so auto-detection won't re-add it on the
//! next balance sweep. Adding a token explicitly lifts the ignore.

use async_trait::async_trait;
use thiserror::Error;

use super::token::{is_valid_address, normalize_address, Asset};
use crate::config::MAX_DECIMALS;
use crate::store::{DbError, WalletDb};

/// Errors raised by token registry operations.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid token address: {0}")]
    InvalidAddress(String),

    #[error("token decimals {0} exceed the maximum of {MAX_DECIMALS}")]
    InvalidDecimals(u8),

    #[error("token symbol must not be empty")]
    EmptySymbol,

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

/// Controller owning the set of tracked tokens.
#[async_trait]
pub trait AssetRegistry: Send + Sync {
    /// Starts tracking `asset`.
    async fn add_token(&self, asset: Asset) -> Result<(), AssetError>;

    /// Stops tracking `address` and keeps it from being re-detected.
    async fn remove_and_ignore_token(&self, address: &str) -> Result<(), AssetError>;

    /// Tracked tokens.
    async fn tokens(&self) -> Result<Vec<Asset>, AssetError>;

    /// Ignored token addresses, lower-cased.
    async fn ignored_tokens(&self) -> Result<Vec<String>, AssetError>;
}

/// [`AssetRegistry`] persisted in the local wallet database.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    db: WalletDb,
}

impl TokenRegistry {
    pub fn new(db: WalletDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AssetRegistry for TokenRegistry {
    async fn add_token(&self, asset: Asset) -> Result<(), AssetError> {
        if !is_valid_address(&asset.address) {
            return Err(AssetError::InvalidAddress(asset.address));
        }
        if asset.decimals > MAX_DECIMALS {
            return Err(AssetError::InvalidDecimals(asset.decimals));
        }
        if asset.symbol.trim().is_empty() {
            return Err(AssetError::EmptySymbol);
        }

        self.db.unignore_token(&asset.address)?;
        self.db.put_token(&asset)?;
        tracing::info!(address = %normalize_address(&asset.address), symbol = %asset.symbol, "token added");
        Ok(())
    }

    async fn remove_and_ignore_token(&self, address: &str) -> Result<(), AssetError> {
        if !is_valid_address(address) {
            return Err(AssetError::InvalidAddress(address.to_string()));
        }
        let was_tracked = self.db.remove_token(address)?;
        self.db.ignore_token(address)?;
        tracing::info!(
            address = %normalize_address(address),
            was_tracked,
            "token removed and ignored"
        );
        Ok(())
    }

    async fn tokens(&self) -> Result<Vec<Asset>, AssetError> {
        Ok(self.db.tokens()?)
    }

    async fn ignored_tokens(&self) -> Result<Vec<String>, AssetError> {
        Ok(self.db.ignored_tokens()?)
    }
}
