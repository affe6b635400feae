//! # Unit Conversion & Display Formatting
//!
//! Turns minimal-unit integers into strings people can read. Two rules keep
//! this module honest:
//!
//! 1. **Integer math for crypto amounts.** A balance is a `u128` count of the
//!    smallest unit plus a `decimals` exponent. Scaling and rounding happen on
//!    integers, so `1500000000000000000` wei is exactly `1.5`, never
//!    `1.4999999999`.
//!
//! 2. **Fiat is one-way.** Fiat values are computed from minimal units (not
//!    from a rendered string), rounded to cents, formatted, and never fed back
//!    into any state. Floating point is acceptable here because the result is
//!    only ever displayed.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::config::{DISPLAY_DECIMALS, MAX_DECIMALS, NATIVE_DECIMALS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing or scaling minimal-unit amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// `10^decimals` does not fit in a `u128`.
    #[error("decimals {0} exceeds the supported maximum of {MAX_DECIMALS}")]
    DecimalsTooLarge(u8),

    /// The input was not a non-negative integer in decimal or `0x` hex form.
    #[error("invalid minimal-unit amount: {0:?}")]
    InvalidAmount(String),
}

// ---------------------------------------------------------------------------
// TokenAmount
// ---------------------------------------------------------------------------

/// A raw balance in a token's smallest unit.
///
/// Balances arrive from the engine as JSON numbers, decimal strings, or `0x`
/// hex strings depending on which controller produced them. All three
/// deserialize into the same value. Serialization always emits a decimal
/// string so 18-decimal balances survive a round trip through JavaScript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// Zero minimal units.
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Wraps a raw minimal-unit count.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw minimal-unit count.
    pub const fn get(self) -> u128 {
        self.0
    }

    /// Parses a decimal or `0x`-prefixed hex string.
    pub fn parse(s: &str) -> Result<Self, UnitsError> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some("") => Ok(0),
            Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
            None => trimmed.parse::<u128>(),
        };
        parsed
            .map(Self)
            .map_err(|_| UnitsError::InvalidAmount(s.to_string()))
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenAmount {
    type Err = UnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> de::Visitor<'de> for AmountVisitor {
            type Value = TokenAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer, decimal string, or 0x hex string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TokenAmount(v as u128))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
                Ok(TokenAmount(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u128::try_from(v)
                    .map(TokenAmount)
                    .map_err(|_| E::custom(format!("negative amount: {v}")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Err(E::custom(format!(
                    "amount {v} lost precision as a float; send it as a string"
                )))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                TokenAmount::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

// ---------------------------------------------------------------------------
// Crypto Amounts
// ---------------------------------------------------------------------------

fn pow10(exp: u32) -> Result<u128, UnitsError> {
    10u128
        .checked_pow(exp)
        .ok_or(UnitsError::DecimalsTooLarge(exp.min(u8::MAX as u32) as u8))
}

/// Exact decimal rendering of a minimal-unit amount.
///
/// Trailing fractional zeros are dropped, and a whole number has no decimal
/// point at all: `(1_500_000, 6)` renders as `"1.5"`, `(2_000_000, 6)` as `"2"`.
pub fn from_token_minimal_unit(value: u128, decimals: u8) -> Result<String, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::DecimalsTooLarge(decimals));
    }
    let base = pow10(decimals as u32)?;
    let whole = value / base;
    let frac = value % base;

    if frac == 0 {
        return Ok(whole.to_string());
    }

    let padded = format!("{:0width$}", frac, width = decimals as usize);
    Ok(format!("{}.{}", whole, padded.trim_end_matches('0')))
}

/// Rounds a minimal-unit amount to `shown` fractional digits (half-up) and
/// renders it like [`from_token_minimal_unit`].
pub fn render_with_precision(value: u128, decimals: u8, shown: u32) -> Result<String, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::DecimalsTooLarge(decimals));
    }
    if decimals as u32 <= shown {
        return from_token_minimal_unit(value, decimals);
    }

    let divisor = pow10(decimals as u32 - shown)?;
    let mut scaled = value / divisor;
    // remainder < divisor <= 10^38, so doubling stays inside u128.
    if (value % divisor) * 2 >= divisor {
        scaled += 1;
    }
    from_token_minimal_unit(scaled, shown as u8)
}

/// Renders a token balance with the standard display precision.
pub fn render_from_token_minimal_unit(value: u128, decimals: u8) -> Result<String, UnitsError> {
    render_with_precision(value, decimals, DISPLAY_DECIMALS)
}

/// Renders a native-unit (wei) balance with the standard display precision.
pub fn render_from_wei(value: u128) -> String {
    // NATIVE_DECIMALS is a compile-time constant well under MAX_DECIMALS.
    render_from_token_minimal_unit(value, NATIVE_DECIMALS).unwrap_or_else(|_| value.to_string())
}

/// Converts minimal units to a floating-point amount for fiat math.
pub fn to_display_amount(value: u128, decimals: u8) -> Result<f64, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::DecimalsTooLarge(decimals));
    }
    Ok(value as f64 / 10f64.powi(decimals as i32))
}

// ---------------------------------------------------------------------------
// Fiat
// ---------------------------------------------------------------------------

/// Rounds to cents.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the fiat value of `amount` tokens, rounded to cents.
///
/// `conversion_rate` maps the reference currency (native unit) to the
/// display currency; `exchange_rate` maps the token to the reference
/// currency.
pub fn balance_to_fiat_number(amount: f64, conversion_rate: f64, exchange_rate: f64) -> f64 {
    round_cents(amount * conversion_rate * exchange_rate)
}

/// Formats the fiat value of `amount` tokens, or `None` when the token has
/// no exchange rate.
pub fn balance_to_fiat(
    amount: f64,
    conversion_rate: f64,
    exchange_rate: Option<f64>,
    currency_code: &str,
) -> Option<String> {
    let rate = exchange_rate?;
    Some(format_currency(
        balance_to_fiat_number(amount, conversion_rate, rate),
        currency_code,
    ))
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "usd" | "aud" | "cad" | "nzd" | "hkd" | "sgd" | "mxn" => Some("$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "jpy" | "cny" => Some("¥"),
        "brl" => Some("R$"),
        "inr" => Some("₹"),
        "krw" => Some("₩"),
        _ => None,
    }
}

/// Formats a fiat value with two decimals.
///
/// Known currency codes get a prefix symbol (`$3000.00`); anything else is
/// suffixed with its upper-cased code (`3000.00 CHF`). No digit grouping.
pub fn format_currency(value: f64, currency_code: &str) -> String {
    // Normalizes -0.0 so a rounded-away negative doesn't render as "-$0.00".
    let value = if value == 0.0 { 0.0 } else { value };
    let code = currency_code.trim().to_lowercase();
    let magnitude = format!("{:.2}", value.abs());
    let sign = if value < 0.0 { "-" } else { "" };

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{magnitude}"),
        None => format!("{sign}{magnitude} {}", code.to_uppercase()),
    }
}

// ---------------------------------------------------------------------------
// Primary Currency
// ---------------------------------------------------------------------------

/// Which denomination a balance row shows first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryCurrency {
    /// The chain's native unit (crypto amount first).
    #[default]
    #[serde(rename = "ETH")]
    Native,
    /// The user's display currency (fiat amount first).
    #[serde(rename = "Fiat")]
    Fiat,
}

/// The two strings of an asset row, ordered by primary currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisplayBalances {
    /// Shown large.
    pub main: String,
    /// Shown small underneath; absent when there's nothing to show.
    pub secondary: Option<String>,
}

impl DisplayBalances {
    /// Orders a crypto string and an optional fiat string.
    ///
    /// Without a fiat value both preferences collapse to the crypto string
    /// on top and nothing underneath.
    pub fn arrange(crypto: String, fiat: Option<String>, primary: PrimaryCurrency) -> Self {
        match (primary, fiat) {
            (PrimaryCurrency::Native, fiat) => Self {
                main: crypto,
                secondary: fiat,
            },
            (PrimaryCurrency::Fiat, Some(fiat)) => Self {
                main: fiat,
                secondary: Some(crypto),
            },
            (PrimaryCurrency::Fiat, None) => Self {
                main: crypto,
                secondary: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
