//! Chain reads: native and ERC-20 balances, token metadata.
//!
//! The wallet signs and broadcasts; everything read-only goes straight to an
//! RPC endpoint through a [`ChainReader`].

use std::fmt;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::warn;

use crate::token::{Asset, TokenInfo, TokenList};

pub mod erc20;
mod mock;
mod rpc;

pub use mock::MockChain;
pub use rpc::RpcChainReader;

/// Error type for chain reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ChainError {
    /// The RPC endpoint could not be set up.
    #[error("Config error: {0}")]
    Config(String),

    /// The RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The call succeeded but returned unexpected data.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ChainError {
    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an RPC error.
    #[must_use]
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Read-only access to one chain.
#[async_trait]
pub trait ChainReader: Send + Sync + fmt::Debug {
    /// Native coin balance of `owner`, in wei.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    /// Raw ERC-20 balance of `owner` on `token` (not adjusted for decimals).
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    /// Decimals of an ERC-20 token.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    async fn erc20_decimals(&self, token: Address) -> Result<u8, ChainError>;

    /// Symbol of an ERC-20 token.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    async fn erc20_symbol(&self, token: Address) -> Result<String, ChainError>;
}

#[async_trait]
impl<R: ChainReader + ?Sized> ChainReader for std::sync::Arc<R> {
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        (**self).native_balance(owner).await
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        (**self).erc20_balance(token, owner).await
    }

    async fn erc20_decimals(&self, token: Address) -> Result<u8, ChainError> {
        (**self).erc20_decimals(token).await
    }

    async fn erc20_symbol(&self, token: Address) -> Result<String, ChainError> {
        (**self).erc20_symbol(token).await
    }
}

/// What an ERC-20 contract reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// `symbol()`.
    pub symbol: String,
    /// `decimals()`.
    pub decimals: u8,
}

/// A configured token next to what its contract reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCheck {
    /// The configured token.
    pub token: TokenInfo,
    /// Contract metadata, or why it could not be read.
    pub onchain: Result<TokenMetadata, ChainError>,
}

impl TokenCheck {
    /// Whether the contract answered and agrees with the configured symbol
    /// (ignoring case) and decimals (when configured).
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.onchain.as_ref().is_ok_and(|meta| {
            meta.symbol.eq_ignore_ascii_case(&self.token.symbol)
                && self.token.decimals.is_none_or(|d| d == meta.decimals)
        })
    }
}

/// Read `symbol()` and `decimals()` of an ERC-20 contract.
///
/// # Errors
///
/// Returns the first failing read.
pub async fn read_metadata<R>(reader: &R, token: Address) -> Result<TokenMetadata, ChainError>
where
    R: ChainReader + ?Sized,
{
    let symbol = reader.erc20_symbol(token).await?;
    let decimals = reader.erc20_decimals(token).await?;
    Ok(TokenMetadata { symbol, decimals })
}

/// Compare every ERC-20 token in `tokens` with its contract.
///
/// The native coin has no contract and is skipped.
pub async fn verify_tokens<R>(reader: &R, tokens: &TokenList) -> Vec<TokenCheck>
where
    R: ChainReader + ?Sized,
{
    let mut checks = Vec::new();
    for token in tokens.iter() {
        let Asset::Erc20(contract) = token.asset else {
            continue;
        };
        let onchain = read_metadata(reader, contract).await;
        if let Err(ref e) = onchain {
            warn!(symbol = %token.symbol, %contract, error = %e, "token metadata unavailable");
        }
        checks.push(TokenCheck {
            token: token.clone(),
            onchain,
        });
    }
    checks
}
