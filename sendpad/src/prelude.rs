//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sendpad::prelude::*;
//! ```

pub use crate::amount::{Balance, format_amount, parse_amount};
pub use crate::chain::{ChainError, ChainReader, MockChain, RpcChainReader};
pub use crate::config::{AppConfig, ConfigError, load_config, load_config_from};
pub use crate::error::{Error, Result, ValidationError};
pub use crate::notify::{
    BoxedNotifier, LogLevel, LoggingNotifier, NoopNotifier, Notification, NotificationLevel,
    Notifier, RecordingNotifier,
};
pub use crate::session::{
    BalanceQuery, SessionState, TransferDraft, TransferForm, WalletSession,
};
pub use crate::token::{Asset, TokenInfo, TokenList};
pub use crate::wallet::{
    Connection, Eip1193, EvmChain, HttpTransport, MockWallet, WalletConnector, WalletError,
    WalletEvent, WalletTransaction,
};
