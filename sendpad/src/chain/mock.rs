//! In-memory chain for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use super::{ChainError, ChainReader};

#[derive(Debug, Default)]
struct State {
    native: HashMap<Address, U256>,
    tokens: HashMap<(Address, Address), U256>,
    metadata: HashMap<Address, (String, u8)>,
    failing: bool,
}

/// A [`ChainReader`] answering from in-memory tables.
///
/// Unknown accounts have a zero balance; unknown tokens fail like a call to
/// an address without code would.
#[derive(Debug, Default)]
pub struct MockChain {
    state: Mutex<State>,
    reads: AtomicUsize,
}

impl MockChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native balance of `owner`.
    #[must_use]
    pub fn with_native(self, owner: Address, balance: U256) -> Self {
        self.set_native(owner, balance);
        self
    }

    /// Register an ERC-20 token.
    #[must_use]
    pub fn with_token(self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.lock()
            .metadata
            .insert(token, (symbol.to_owned(), decimals));
        self
    }

    /// Set the token balance of `owner`.
    #[must_use]
    pub fn with_token_balance(self, token: Address, owner: Address, balance: U256) -> Self {
        self.set_token_balance(token, owner, balance);
        self
    }

    /// Update a native balance on a shared mock.
    pub fn set_native(&self, owner: Address, balance: U256) {
        self.lock().native.insert(owner, balance);
    }

    /// Update a token balance on a shared mock.
    pub fn set_token_balance(&self, token: Address, owner: Address, balance: U256) {
        self.lock().tokens.insert((token, owner), balance);
    }

    /// Make every subsequent read fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of reads served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>, ChainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.failing {
            return Err(ChainError::rpc("mock chain unavailable"));
        }
        Ok(state)
    }

    fn metadata(&self, token: Address) -> Result<(String, u8), ChainError> {
        self.begin()?
            .metadata
            .get(&token)
            .cloned()
            .ok_or_else(|| ChainError::decode(format!("no contract at {token}")))
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        Ok(self.begin()?.native.get(&owner).copied().unwrap_or_default())
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let state = self.begin()?;
        if !state.metadata.contains_key(&token) {
            return Err(ChainError::decode(format!("no contract at {token}")));
        }
        Ok(state.tokens.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn erc20_decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.metadata(token).map(|(_, decimals)| decimals)
    }

    async fn erc20_symbol(&self, token: Address) -> Result<String, ChainError> {
        self.metadata(token).map(|(symbol, _)| symbol)
    }
}
