//! # Asset Records
//!
//! An [`Asset`] is a row in the token list: identity (address, symbol,
//! decimals) plus optional cosmetics. The native unit is an `Asset` too; it
//! has no contract address and `is_native` set.
//!
//! Addresses are hex strings whose case carries a checksum, not meaning.
//! Everything that keys on an address goes through [`normalize_address`].

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_TICKER, NATIVE_DECIMALS};

/// Length of a contract address in bytes.
const ADDRESS_BYTES: usize = 20;

/// A token (or the native unit) as shown in the token list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Contract address. Empty for the native unit.
    #[serde(default)]
    pub address: String,

    /// Ticker, e.g. `DAI`.
    pub symbol: String,

    /// Decimal places between the minimal unit and one whole token.
    pub decimals: u8,

    #[serde(default)]
    pub name: Option<String>,

    /// Logo URI, if the registry knows one.
    #[serde(default)]
    pub logo: Option<String>,

    /// `true` for the chain's native unit.
    #[serde(default, alias = "isETH", alias = "isEth")]
    pub is_native: bool,

    /// Pre-rendered crypto balance. Wins over a computed one.
    #[serde(default)]
    pub balance: Option<String>,

    /// Pre-rendered fiat balance. Wins over a computed one.
    #[serde(default)]
    pub balance_fiat: Option<String>,
}

impl Asset {
    /// An ERC-20 style token with no cosmetics.
    pub fn token(address: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals,
            name: None,
            logo: None,
            is_native: false,
            balance: None,
            balance_fiat: None,
        }
    }

    /// The chain's native unit.
    pub fn native(ticker: Option<&str>) -> Self {
        let symbol = ticker.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TICKER);
        Self {
            is_native: true,
            name: Some(symbol.to_string()),
            ..Self::token("", symbol, NATIVE_DECIMALS)
        }
    }

    /// Stable key for list rendering. The native unit uses `0x`.
    pub fn key(&self) -> &str {
        if self.address.is_empty() {
            "0x"
        } else {
            &self.address
        }
    }
}

/// Lower-cases and trims an address for use as a lookup key.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Compares two addresses ignoring checksum casing.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// `true` for a `0x`-prefixed, 20-byte hex address.
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .and_then(|digits| hex::decode(digits).ok())
        .is_some_and(|bytes| bytes.len() == ADDRESS_BYTES)
}
