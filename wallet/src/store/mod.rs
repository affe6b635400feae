//! # Store Module: Snapshots In, Durable State Out
//!
//! Two very different things share this module because they are the two
//! halves of "state" as the screens see it:
//!
//! ```text
//! snapshot.rs - read-only projection of the application store
//! db.rs       - sled database backing the reference controllers
//! ```
//!
//! Views only ever receive an [`AppSnapshot`]. They never hold a reference
//! to the store that produced it, and they never write to a snapshot. The
//! [`WalletDb`] sits behind the controller traits (flag store, keychain,
//! vault, token registry) and is invisible to view code.

pub mod db;
pub mod snapshot;

pub use db::{DbError, DbResult, FlagStore, WalletDb};
pub use snapshot::{AccountInfo, AppSnapshot, PendingTransaction, SnapshotError, TransactionDraft};
