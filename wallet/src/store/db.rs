//! # WalletDb: Durable Local State
//!
//! The persistence layer behind the reference controllers, built on sled's
//! embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree             | Key                     | Value                 |
//! |------------------|-------------------------|-----------------------|
//! | `flags`          | flag key (UTF-8)        | flag value (UTF-8)    |
//! | `vault`          | `current`               | sealed vault bytes    |
//! | `keychain`       | account label (UTF-8)   | `bincode(entry)`      |
//! | `tokens`         | lower-case address      | `bincode(Asset)`      |
//! | `ignored_tokens` | lower-case address      | empty                 |
//!
//! Every write is flushed before returning. The screens treat a successful
//! controller call as durable, and onboarding in particular must not report
//! success and then lose the flag on a crash.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};
use std::path::Path;

use crate::assets::{normalize_address, Asset};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("stored value for {0} is not valid UTF-8")]
    Utf8(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Key of the single vault entry.
const VAULT_KEY: &[u8] = b"current";

// ---------------------------------------------------------------------------
// WalletDb
// ---------------------------------------------------------------------------

/// Local wallet storage.
///
/// Cheap to clone; clones share the same sled instance.
#[derive(Debug, Clone)]
pub struct WalletDb {
    db: Db,
    flags: Tree,
    vault: Tree,
    keychain: Tree,
    tokens: Tree,
    ignored_tokens: Tree,
}

impl WalletDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        Ok(Self {
            flags: db.open_tree("flags")?,
            vault: db.open_tree("vault")?,
            keychain: db.open_tree("keychain")?,
            tokens: db.open_tree("tokens")?,
            ignored_tokens: db.open_tree("ignored_tokens")?,
            db,
        })
    }

    // -- Flags --------------------------------------------------------------

    /// Sets a durable string flag.
    pub fn set_flag(&self, key: &str, value: &str) -> DbResult<()> {
        self.flags.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Reads a durable string flag.
    pub fn get_flag(&self, key: &str) -> DbResult<Option<String>> {
        match self.flags.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| DbError::Utf8(key.to_string())),
            None => Ok(None),
        }
    }

    // -- Vault --------------------------------------------------------------

    /// Replaces the stored vault blob.
    pub fn put_vault(&self, sealed: &[u8]) -> DbResult<()> {
        self.vault.insert(VAULT_KEY, sealed)?;
        self.db.flush()?;
        Ok(())
    }

    /// Returns the stored vault blob.
    pub fn get_vault(&self) -> DbResult<Option<Vec<u8>>> {
        Ok(self.vault.get(VAULT_KEY)?.map(|v| v.to_vec()))
    }

    /// `true` when a vault has been created.
    pub fn has_vault(&self) -> DbResult<bool> {
        Ok(self.vault.contains_key(VAULT_KEY)?)
    }

    // -- Keychain -----------------------------------------------------------

    /// Stores a keychain entry under `label`.
    pub fn put_keychain_entry<T: Serialize>(&self, label: &str, entry: &T) -> DbResult<()> {
        self.keychain.insert(label.as_bytes(), encode(entry)?)?;
        self.db.flush()?;
        Ok(())
    }

    /// Reads the keychain entry under `label`.
    pub fn get_keychain_entry<T: DeserializeOwned>(&self, label: &str) -> DbResult<Option<T>> {
        self.keychain
            .get(label.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Deletes the keychain entry under `label`. Returns `true` if it existed.
    pub fn remove_keychain_entry(&self, label: &str) -> DbResult<bool> {
        let existed = self.keychain.remove(label.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    // -- Tokens -------------------------------------------------------------

    /// Tracks a token. Re-adding an address overwrites its metadata.
    pub fn put_token(&self, asset: &Asset) -> DbResult<()> {
        let key = normalize_address(&asset.address);
        self.tokens.insert(key.as_bytes(), encode(asset)?)?;
        self.db.flush()?;
        Ok(())
    }

    /// Stops tracking a token. Returns `true` if it was tracked.
    pub fn remove_token(&self, address: &str) -> DbResult<bool> {
        let key = normalize_address(address);
        let existed = self.tokens.remove(key.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// All tracked tokens, ordered by address.
    pub fn tokens(&self) -> DbResult<Vec<Asset>> {
        self.tokens
            .iter()
            .values()
            .map(|value| decode(&value?))
            .collect()
    }

    /// Records an address the user asked not to see again.
    pub fn ignore_token(&self, address: &str) -> DbResult<()> {
        let key = normalize_address(address);
        self.ignored_tokens.insert(key.as_bytes(), Vec::<u8>::new())?;
        self.db.flush()?;
        Ok(())
    }

    /// Clears an ignore entry. Returns `true` if the address was ignored.
    pub fn unignore_token(&self, address: &str) -> DbResult<bool> {
        let key = normalize_address(address);
        let existed = self.ignored_tokens.remove(key.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// All ignored addresses, lower-cased.
    pub fn ignored_tokens(&self) -> DbResult<Vec<String>> {
        self.ignored_tokens
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec())
                    .map_err(|_| DbError::Utf8("ignored token key".to_string()))
            })
            .collect()
    }
}

fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// FlagStore
// ---------------------------------------------------------------------------

/// Durable string flags read by app bootstrap.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;

    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;
}

#[async_trait]
impl FlagStore for WalletDb {
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.set_flag(key, value)?;
        tracing::debug!(key, "flag stored");
        Ok(())
    }

    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.get_flag(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn dai() -> Asset {
        Asset::token("0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18)
    }

    #[test]
    fn open_temporary_database() {
        let db = WalletDb::open_temporary().expect("temp db");
        assert!(db.tokens().unwrap().is_empty());
        assert!(!db.has_vault().unwrap());
    }

    #[test]
    fn open_persistent_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet");
        {
            let db = WalletDb::open(&path).unwrap();
            db.set_flag("k", "v").unwrap();
        }
        let db = WalletDb::open(&path).unwrap();
        assert_eq!(db.get_flag("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn flags_roundtrip() {
        let db = WalletDb::open_temporary().unwrap();
        assert_eq!(db.get_flag("missing").unwrap(), None);
        db.set_flag("@NovaWallet:existingUser", "true").unwrap();
        assert_eq!(
            db.get_flag("@NovaWallet:existingUser").unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn vault_blob_overwrites() {
        let db = WalletDb::open_temporary().unwrap();
        db.put_vault(b"first").unwrap();
        db.put_vault(b"second").unwrap();
        assert_eq!(db.get_vault().unwrap().unwrap(), b"second");
        assert!(db.has_vault().unwrap());
    }

    #[test]
    fn keychain_entries_crud() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Entry {
            secret: String,
        }

        let db = WalletDb::open_temporary().unwrap();
        let entry = Entry {
            secret: "hunter22".into(),
        };
        db.put_keychain_entry("user", &entry).unwrap();
        assert_eq!(db.get_keychain_entry::<Entry>("user").unwrap(), Some(entry));
        assert!(db.remove_keychain_entry("user").unwrap());
        assert!(!db.remove_keychain_entry("user").unwrap());
        assert_eq!(db.get_keychain_entry::<Entry>("user").unwrap(), None);
    }

    #[test]
    fn tokens_keyed_by_lowercase_address() {
        let db = WalletDb::open_temporary().unwrap();
        db.put_token(&dai()).unwrap();
        db.put_token(&dai()).unwrap();
        assert_eq!(db.tokens().unwrap().len(), 1);

        assert!(db
            .remove_token("0x6b175474e89094c44da98b954eedeac495271d0f")
            .unwrap());
        assert!(db.tokens().unwrap().is_empty());
    }

    #[test]
    fn ignore_list() {
        let db = WalletDb::open_temporary().unwrap();
        db.ignore_token("0xABCDEF").unwrap();
        assert_eq!(db.ignored_tokens().unwrap(), vec!["0xabcdef".to_string()]);
        assert!(db.unignore_token("0xAbCdEf").unwrap());
        assert!(db.ignored_tokens().unwrap().is_empty());
        assert!(!db.unignore_token("0xabcdef").unwrap());
    }

    #[tokio::test]
    async fn flag_store_trait() {
        let db = WalletDb::open_temporary().unwrap();
        let store: &dyn FlagStore = &db;
        store.set_item("a", "1").await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap().as_deref(), Some("1"));
    }
}
