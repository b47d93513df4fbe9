//! Conversion between user-typed decimal amounts and fixed-point integers.
//!
//! Token amounts travel on chain as integers scaled by `10^decimals`. The
//! form takes whatever the user typed; [`parse_amount`] turns it into that
//! integer and [`format_amount`] goes back for display.

use std::fmt;

use alloy::primitives::U256;
use alloy::primitives::utils::{format_units, parse_units};

use crate::error::ValidationError;

/// Parse a user-typed decimal amount into a raw integer with `decimals` places.
///
/// Accepts `"1"`, `"1.5"`, `".5"` and `"5."`. Rejects empty input, signs,
/// exponents, separators, more fractional digits than the token has, and zero.
///
/// # Errors
///
/// Returns the matching [`ValidationError`].
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }

    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let well_formed = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(ValidationError::InvalidAmount(input.to_owned()));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(ValidationError::TooManyDecimals { decimals });
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    };

    let raw = parse_units(&normalized, decimals)
        .map_err(|e| ValidationError::InvalidAmount(format!("{input}: {e}")))?
        .get_absolute();

    if raw.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(raw)
}

/// Format a raw integer amount with `decimals` places, trimming trailing zeros.
///
/// `format_amount(U256::from(1_500_000), 6)` is `"1.5"`.
#[must_use]
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(raw, decimals) else {
        return raw.to_string();
    };
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_owned()
    } else {
        formatted
    }
}

/// A fetched balance: raw integer, decimal count and symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Raw on-chain amount.
    pub raw: U256,
    /// Decimal places of the asset.
    pub decimals: u8,
    /// Ticker of the asset.
    pub symbol: String,
}

impl Balance {
    /// Create a balance.
    #[must_use]
    pub fn new(raw: U256, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            raw,
            decimals,
            symbol: symbol.into(),
        }
    }

    /// The amount as a display string without the symbol.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_amount(self.raw, self.decimals)
    }

    /// Whether `amount` (raw) can be paid from this balance.
    #[must_use]
    pub fn covers(&self, amount: U256) -> bool {
        self.raw >= amount
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.formatted(), self.symbol)
    }
}
