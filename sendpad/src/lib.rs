//! Sendpad - wallet-connected transfers for EVM chains
//!
//! This crate is the state and orchestration layer of a small wallet front
//! end: connect the user's injected wallet, show the balance of the native
//! coin or a configured ERC-20 token, and send a transfer of either through
//! the wallet.
//!
//! Keys never touch this crate. Signing and broadcasting are delegated to
//! the wallet over its EIP-1193 `request` interface; balances are read from
//! a JSON-RPC node.

pub mod amount;
pub mod chain;
pub mod config;
pub mod error;
pub mod notify;
pub mod prelude;
pub mod session;
pub mod token;
pub mod wallet;

pub use error::{Error, Result, ValidationError};
