//! Wallet connector: the user's injected wallet, reached through EIP-1193.
//!
//! The wallet holds the keys and signs; this module only asks it for an
//! account, its chain, and to send transactions.
//!
//! # Architecture
//!
//! ```text
//! Eip1193 transport (browser binding / HttpTransport / MockWallet)
//!   → WalletConnector (typed connect, switch_chain, send_transaction)
//!     → WalletSession (UI state + notifications)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sendpad::wallet::{HttpTransport, WalletConnector};
//!
//! # async fn example() -> Result<(), sendpad::wallet::WalletError> {
//! let mut connector = WalletConnector::new(HttpTransport::new("http://127.0.0.1:8545")?);
//! let connection = connector.connect().await?;
//! println!("{} on chain {}", connection.address, connection.chain_id);
//! # Ok(())
//! # }
//! ```

use std::fmt;

mod connector;
mod eip1193;
mod error;
mod http;
mod mock;

pub use connector::{Connection, WalletConnector};
pub use eip1193::{
    AddChainParams, Eip1193, NativeCurrency, WalletEvent, WalletTransaction, hex_chain_id,
    methods, parse_accounts, parse_chain_id,
};
pub use error::WalletError;
pub use http::HttpTransport;
pub use mock::{MockWallet, RecordedCall};

/// EIP-1193 error codes.
pub mod codes {
    pub use super::error::{
        CHAIN_DISCONNECTED, DISCONNECTED, METHOD_NOT_FOUND, UNAUTHORIZED, UNRECOGNIZED_CHAIN,
        UNSUPPORTED_METHOD, USER_REJECTED,
    };
}

/// Known EVM-compatible chains with their chain IDs and native coins.
///
/// # Examples
///
/// ```rust
/// use sendpad::wallet::EvmChain;
///
/// let chain = EvmChain::from_id(97);
/// assert_eq!(chain, EvmChain::BscTestnet);
/// assert_eq!(chain.native_symbol(), "tBNB");
///
/// let chain = EvmChain::from_id(999);
/// assert_eq!(chain.name(), "evm-999");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvmChain {
    /// Ethereum Mainnet (chain ID: 1).
    Ethereum,
    /// Sepolia Testnet (chain ID: 11155111).
    Sepolia,
    /// Holesky Testnet (chain ID: 17000).
    Holesky,
    /// Optimism (chain ID: 10).
    Optimism,
    /// BNB Smart Chain (chain ID: 56).
    Bsc,
    /// BNB Smart Chain Testnet (chain ID: 97).
    BscTestnet,
    /// Polygon `PoS` (chain ID: 137).
    Polygon,
    /// Base (chain ID: 8453).
    Base,
    /// Arbitrum One (chain ID: 42161).
    Arbitrum,
    /// Avalanche C-Chain (chain ID: 43114).
    Avalanche,
    /// Local development node (chain ID: 31337).
    Local,
    /// Any other chain.
    Custom {
        /// Numeric chain ID.
        id: u64,
        /// Human-readable chain name.
        name: String,
        /// Native coin ticker.
        native_symbol: String,
    },
}

impl EvmChain {
    /// Get the numeric chain ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Sepolia => 11_155_111,
            Self::Holesky => 17_000,
            Self::Optimism => 10,
            Self::Bsc => 56,
            Self::BscTestnet => 97,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Arbitrum => 42_161,
            Self::Avalanche => 43_114,
            Self::Local => 31_337,
            Self::Custom { id, .. } => *id,
        }
    }

    /// Get the human-readable chain name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Sepolia => "sepolia",
            Self::Holesky => "holesky",
            Self::Optimism => "optimism",
            Self::Bsc => "bsc",
            Self::BscTestnet => "bsc-testnet",
            Self::Polygon => "polygon",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::Avalanche => "avalanche",
            Self::Local => "local",
            Self::Custom { name, .. } => name,
        }
    }

    /// Ticker of the chain's native coin.
    #[must_use]
    pub fn native_symbol(&self) -> &str {
        match self {
            Self::Bsc => "BNB",
            Self::BscTestnet => "tBNB",
            Self::Polygon => "POL",
            Self::Avalanche => "AVAX",
            Self::Custom { native_symbol, .. } => native_symbol,
            _ => "ETH",
        }
    }

    /// Infer an [`EvmChain`] from a numeric chain ID.
    ///
    /// Unknown chain IDs produce [`EvmChain::Custom`] with a generic name and
    /// an `ETH` native coin.
    #[must_use]
    pub fn from_id(id: u64) -> Self {
        match id {
            1 => Self::Ethereum,
            10 => Self::Optimism,
            56 => Self::Bsc,
            97 => Self::BscTestnet,
            137 => Self::Polygon,
            8453 => Self::Base,
            17_000 => Self::Holesky,
            31_337 => Self::Local,
            42_161 => Self::Arbitrum,
            43_114 => Self::Avalanche,
            11_155_111 => Self::Sepolia,
            _ => Self::Custom {
                id,
                name: format!("evm-{id}"),
                native_symbol: "ETH".to_owned(),
            },
        }
    }
}

impl fmt::Display for EvmChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}
