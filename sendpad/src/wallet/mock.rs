//! Scripted wallet for testing.
//!
//! [`MockWallet`] answers EIP-1193 requests from per-method queues and
//! records every call, so tests can assert both on what the session did and
//! on what it did *not* do.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde_json::{Value, json};

use super::WalletError;
use super::eip1193::{Eip1193, hex_chain_id, methods};

/// A recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Method name.
    pub method: String,
    /// Parameters as sent.
    pub params: Value,
}

#[derive(Debug, Default)]
struct Inner {
    scripted: HashMap<String, VecDeque<Result<Value, WalletError>>>,
    fallback: HashMap<String, Result<Value, WalletError>>,
    calls: Vec<RecordedCall>,
}

/// A test wallet with scripted responses.
///
/// For each method, queued responses are returned first, in order; after the
/// queue is empty the method's default response is returned. Methods with
/// neither answer with [`WalletError::UnsupportedMethod`].
#[derive(Debug, Default)]
pub struct MockWallet {
    inner: Mutex<Inner>,
}

impl MockWallet {
    /// An empty mock that supports no methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock wallet holding `account` on `chain_id` that approves everything.
    ///
    /// Transactions return `tx_hash`.
    #[must_use]
    pub fn unlocked(account: Address, chain_id: u64, tx_hash: B256) -> Self {
        Self::new()
            .with_default(methods::REQUEST_ACCOUNTS, Ok(json!([account])))
            .with_default(methods::ACCOUNTS, Ok(json!([account])))
            .with_default(methods::CHAIN_ID, Ok(json!(hex_chain_id(chain_id))))
            .with_default(methods::SEND_TRANSACTION, Ok(json!(tx_hash)))
            .with_default(methods::SWITCH_CHAIN, Ok(Value::Null))
            .with_default(methods::ADD_CHAIN, Ok(Value::Null))
            .with_default(methods::REVOKE_PERMISSIONS, Ok(Value::Null))
    }

    /// Set the response returned once the queue for `method` is drained.
    #[must_use]
    pub fn with_default(self, method: &str, response: Result<Value, WalletError>) -> Self {
        self.lock().fallback.insert(method.to_owned(), response);
        self
    }

    /// Queue a one-shot response for `method`.
    #[must_use]
    pub fn with_response(self, method: &str, response: Result<Value, WalletError>) -> Self {
        self.push_response(method, response);
        self
    }

    /// Queue a one-shot response for `method` on a shared mock.
    pub fn push_response(&self, method: &str, response: Result<Value, WalletError>) {
        self.lock()
            .scripted
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    /// All requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of requests received for `method`.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// The most recent request for `method`, if any.
    #[must_use]
    pub fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|c| c.method == method)
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Eip1193 for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall {
            method: method.to_owned(),
            params,
        });

        if let Some(response) = inner.scripted.get_mut(method).and_then(VecDeque::pop_front) {
            return response;
        }
        inner
            .fallback
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(WalletError::from_rpc(-32601, format!("{method} not mocked"))))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_come_before_default() {
        let mock = MockWallet::new()
            .with_default("eth_chainId", Ok(json!("0x1")))
            .with_response("eth_chainId", Ok(json!("0x89")));

        assert_eq!(mock.request("eth_chainId", json!([])).await.unwrap(), json!("0x89"));
        assert_eq!(mock.request("eth_chainId", json!([])).await.unwrap(), json!("0x1"));
        assert_eq!(mock.call_count("eth_chainId"), 2);
    }

    #[tokio::test]
    async fn unknown_methods_are_unsupported() {
        let mock = MockWallet::new();
        let err = mock.request("eth_sign", json!([])).await.unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedMethod(_)));
        assert_eq!(mock.calls().len(), 1);
    }
}
