//! Error types for wallet provider interactions.
//!
//! [`WalletError`] follows the EIP-1193 provider error codes, so a rejection
//! in the wallet UI, a locked account, or an unknown chain each surface as a
//! distinct variant. Transport and decoding failures are kept separate from
//! errors the wallet itself reported.

/// User rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// The requested method or account has not been authorized by the user.
pub const UNAUTHORIZED: i64 = 4100;
/// The provider does not support the requested method.
pub const UNSUPPORTED_METHOD: i64 = 4200;
/// The provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// The provider is not connected to the requested chain.
pub const CHAIN_DISCONNECTED: i64 = 4901;
/// The chain has not been added to the wallet (`wallet_switchEthereumChain`).
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Error type for wallet provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    /// No wallet provider could be reached (extension missing, node down).
    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    /// The user rejected the request in the wallet.
    #[error("Request rejected by user: {0}")]
    Rejected(String),

    /// The account or method is not authorized.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The wallet does not implement the method.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The wallet is disconnected from the chain.
    #[error("Wallet disconnected: {0}")]
    Disconnected(String),

    /// The wallet does not know the requested chain.
    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(String),

    /// Any other error reported by the provider.
    #[error("Provider error {code}: {message}")]
    Rpc {
        /// EIP-1193 / JSON-RPC error code.
        code: i64,
        /// Message returned by the provider.
        message: String,
    },

    /// An operation needed a connected account but there is none.
    #[error("Wallet not connected")]
    NotConnected,

    /// The request could not be delivered.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with something we could not decode.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl WalletError {
    /// Map a provider error code and message to the matching variant.
    #[must_use]
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED => Self::Rejected(message),
            UNAUTHORIZED => Self::Unauthorized(message),
            UNSUPPORTED_METHOD | METHOD_NOT_FOUND => Self::UnsupportedMethod(message),
            DISCONNECTED | CHAIN_DISCONNECTED => Self::Disconnected(message),
            UNRECOGNIZED_CHAIN => Self::UnrecognizedChain(message),
            _ => Self::Rpc { code, message },
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// The EIP-1193 code this error corresponds to, if any.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected(_) => Some(USER_REJECTED),
            Self::Unauthorized(_) => Some(UNAUTHORIZED),
            Self::UnsupportedMethod(_) => Some(UNSUPPORTED_METHOD),
            Self::Disconnected(_) => Some(DISCONNECTED),
            Self::UnrecognizedChain(_) => Some(UNRECOGNIZED_CHAIN),
            Self::Rpc { code, .. } => Some(*code),
            Self::Unavailable(_) | Self::NotConnected | Self::Transport(_) | Self::Decode(_) => {
                None
            }
        }
    }

    /// Whether the user actively declined the request.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
