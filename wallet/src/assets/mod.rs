//! # Assets Module: Token Metadata & Tracking
//!
//! ```text
//! token.rs    - the Asset record and address helpers
//! registry.rs - tracked/ignored token sets behind the AssetRegistry trait
//! ```
//!
//! As everywhere else in this crate, balances are minimal-unit integers and
//! `decimals` only matters at display time.

pub mod registry;
pub mod token;

pub use registry::{AssetError, AssetRegistry, TokenRegistry};
pub use token::{addresses_match, is_valid_address, normalize_address, Asset};
