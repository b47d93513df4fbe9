//! [`ChainReader`] over a JSON-RPC endpoint, backed by [`alloy`].

use std::sync::Arc;

use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use futures::Stream;
use tracing::{debug, info};

use super::{ChainError, ChainReader, erc20};

/// Reads balances and token metadata from an RPC endpoint.
#[derive(Clone)]
pub struct RpcChainReader {
    /// Type-erased JSON-RPC provider.
    provider: Arc<DynProvider<Ethereum>>,
    rpc_url: String,
    chain_id: u64,
}

impl std::fmt::Debug for RpcChainReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainReader")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl RpcChainReader {
    /// Connect to `rpc_url` and read its chain ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the endpoint does not answer.
    pub async fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let provider: DynProvider<Ethereum> = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| ChainError::config(format!("RPC connection to '{rpc_url}' failed: {e}")))?
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::rpc(format!("failed to get chain ID: {e}")))?;

        info!(rpc_url, chain_id, "chain reader connected");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_owned(),
            chain_id,
        })
    }

    /// Chain ID reported by the endpoint at connect time.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The endpoint URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Reference to the underlying [`DynProvider`].
    #[must_use]
    pub fn provider(&self) -> &DynProvider<Ethereum> {
        &self.provider
    }

    /// Stream the hashes of new blocks, polled through a block filter.
    ///
    /// Feed it to
    /// [`WalletSession::refresh_on_new_blocks`](crate::session::WalletSession::refresh_on_new_blocks)
    /// to keep a balance current.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint refuses to install the filter.
    pub async fn watch_blocks(
        &self,
    ) -> Result<impl Stream<Item = Vec<B256>> + use<>, ChainError> {
        let poller = self
            .provider
            .watch_blocks()
            .await
            .map_err(|e| ChainError::rpc(format!("failed to watch blocks: {e}")))?;
        debug!(rpc_url = %self.rpc_url, "watching new blocks");
        Ok(poller.into_stream())
    }

    /// Execute a read-only contract call (`eth_call`).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(|e| ChainError::rpc(format!("eth_call to {to} failed: {e}")))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        let balance = self
            .provider
            .get_balance(owner)
            .await
            .map_err(|e| ChainError::rpc(format!("get_balance failed: {e}")))?;
        debug!(owner = %owner, %balance, "native balance");
        Ok(balance)
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        let result = self.call(token, erc20::balance_of_calldata(owner)).await?;
        let balance = erc20::decode_balance(&result)?;
        debug!(token = %token, owner = %owner, %balance, "token balance");
        Ok(balance)
    }

    async fn erc20_decimals(&self, token: Address) -> Result<u8, ChainError> {
        let result = self.call(token, erc20::decimals_calldata()).await?;
        erc20::decode_decimals(&result)
    }

    async fn erc20_symbol(&self, token: Address) -> Result<String, ChainError> {
        let result = self.call(token, erc20::symbol_calldata()).await?;
        erc20::decode_symbol(&result)
    }
}
