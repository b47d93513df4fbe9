//! Unified error types for sendpad.
//!
//! This module provides the error hierarchy covering:
//! - Wallet provider errors (rejections, missing wallet, transport)
//! - Chain read errors
//! - Client-side form validation
//! - Configuration errors

use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::wallet::WalletError;

/// Result type alias for sendpad operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Wallet provider error.
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Chain read error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Input rejected before anything was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether this error was raised client-side without calling the wallet or chain.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Client-side validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The amount field is empty.
    #[error("amount is required")]
    EmptyAmount,

    /// The amount is not a plain decimal number.
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),

    /// The amount has more fractional digits than the token supports.
    #[error("amount has more than {decimals} decimal places")]
    TooManyDecimals {
        /// Decimal places of the token.
        decimals: u8,
    },

    /// The amount is zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// The recipient field is empty.
    #[error("recipient address is required")]
    EmptyRecipient,

    /// The recipient is not a 20-byte hex address.
    #[error("'{0}' is not a valid address")]
    InvalidRecipient(String),

    /// The amount exceeds the last fetched balance.
    #[error("insufficient balance: {available} available")]
    InsufficientBalance {
        /// Formatted balance, symbol included.
        available: String,
    },

    /// No token with this symbol is configured.
    #[error("unknown token '{0}'")]
    UnknownToken(String),

    /// The action needs a connected wallet.
    #[error("connect a wallet first")]
    NotConnected,
}
