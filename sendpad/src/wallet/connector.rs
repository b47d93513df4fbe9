//! Connection management on top of an [`Eip1193`] wallet.
//!
//! [`WalletConnector`] keeps the connected account and chain, and turns the
//! wallet's untyped `request` calls into typed operations.

use alloy::primitives::{Address, B256};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::eip1193::{
    AddChainParams, Eip1193, NativeCurrency, WalletEvent, WalletTransaction, hex_chain_id,
    methods, parse_accounts, parse_chain_id,
};
use super::{EvmChain, WalletError};

/// A live wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// The first account the wallet exposed.
    pub address: Address,
    /// The chain the wallet is on.
    pub chain_id: u64,
}

/// Typed wrapper over an EIP-1193 wallet.
#[derive(Debug)]
pub struct WalletConnector<T> {
    transport: T,
    connection: Option<Connection>,
}

impl<T: Eip1193> WalletConnector<T> {
    /// Wrap a transport. Nothing is requested until [`connect`](Self::connect).
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            connection: None,
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The current connection, if any.
    #[must_use]
    pub const fn connection(&self) -> Option<Connection> {
        self.connection
    }

    /// The connected account.
    #[must_use]
    pub fn account(&self) -> Option<Address> {
        self.connection.map(|c| c.address)
    }

    /// The chain the wallet reported.
    #[must_use]
    pub fn chain_id(&self) -> Option<u64> {
        self.connection.map(|c| c.chain_id)
    }

    /// Whether an account is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Ask the wallet for an account and read its chain.
    ///
    /// Wallets that do not implement `eth_requestAccounts` are asked for
    /// `eth_accounts` instead.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Rejected`] if the user declines or no account is
    /// exposed, or any transport/provider error.
    pub async fn connect(&mut self) -> Result<Connection, WalletError> {
        let accounts = match self
            .transport
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await
        {
            Ok(value) => value,
            Err(WalletError::UnsupportedMethod(_)) => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.transport.request(methods::ACCOUNTS, json!([])).await?
            }
            Err(e) => return Err(e),
        };

        let address = parse_accounts(accounts)?
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Rejected("wallet exposed no accounts".into()))?;

        let chain_id = self.read_chain_id().await?;
        let connection = Connection { address, chain_id };
        self.connection = Some(connection);

        info!(
            address = %address,
            chain = %EvmChain::from_id(chain_id),
            "wallet connected",
        );
        Ok(connection)
    }

    /// Forget the connection and ask the wallet to revoke its permissions.
    ///
    /// Local state is cleared even if the wallet refuses; most wallets have
    /// no programmatic disconnect.
    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let params = json!([{ "eth_accounts": {} }]);
        if let Err(e) = self
            .transport
            .request(methods::REVOKE_PERMISSIONS, params)
            .await
        {
            debug!(error = %e, "wallet_revokePermissions failed, clearing locally");
        }
        info!(address = %connection.address, "wallet disconnected");
    }

    /// Ask the wallet for its current chain.
    ///
    /// # Errors
    ///
    /// Returns a provider error or [`WalletError::Decode`].
    pub async fn read_chain_id(&self) -> Result<u64, WalletError> {
        let value = self.transport.request(methods::CHAIN_ID, json!([])).await?;
        parse_chain_id(&value)
    }

    /// Switch the wallet to `chain`, adding it first if the wallet does not know it.
    ///
    /// `rpc_url` is only used when the chain has to be added.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Rejected`] if the user declines either prompt,
    /// or any other provider error.
    pub async fn switch_chain(
        &mut self,
        chain: &EvmChain,
        rpc_url: &str,
    ) -> Result<(), WalletError> {
        let params = json!([{ "chainId": hex_chain_id(chain.id()) }]);
        match self
            .transport
            .request(methods::SWITCH_CHAIN, params.clone())
            .await
        {
            Ok(_) => {}
            Err(WalletError::UnrecognizedChain(_)) => {
                info!(chain = %chain, "chain unknown to wallet, requesting add");
                let add = AddChainParams {
                    chain_id: hex_chain_id(chain.id()),
                    chain_name: chain.name().to_owned(),
                    rpc_urls: vec![rpc_url.to_owned()],
                    native_currency: NativeCurrency {
                        name: chain.native_symbol().to_owned(),
                        symbol: chain.native_symbol().to_owned(),
                        decimals: 18,
                    },
                };
                let add = serde_json::to_value(add)
                    .map_err(|e| WalletError::decode(format!("add chain params: {e}")))?;
                self.transport
                    .request(methods::ADD_CHAIN, Value::Array(vec![add]))
                    .await?;
                self.transport.request(methods::SWITCH_CHAIN, params).await?;
            }
            Err(e) => return Err(e),
        }

        if let Some(connection) = self.connection.as_mut() {
            connection.chain_id = chain.id();
        }
        info!(chain = %chain, "wallet switched chain");
        Ok(())
    }

    /// Hand a transaction to the wallet for signing and broadcast.
    ///
    /// The sender is always the connected account.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotConnected`] without contacting the wallet if
    /// no account is connected; otherwise any provider error.
    pub async fn send_transaction(&self, mut tx: WalletTransaction) -> Result<B256, WalletError> {
        let from = self.account().ok_or(WalletError::NotConnected)?;
        tx.from = Some(from);

        let params = serde_json::to_value(&tx)
            .map_err(|e| WalletError::decode(format!("transaction params: {e}")))?;
        let hash = self
            .transport
            .request(methods::SEND_TRANSACTION, Value::Array(vec![params]))
            .await?;

        let hash: B256 = serde_json::from_value(hash)
            .map_err(|e| WalletError::decode(format!("invalid transaction hash: {e}")))?;
        info!(from = %from, to = %tx.to, hash = %hash, "transaction submitted");
        Ok(hash)
    }

    /// Apply an event pushed by the wallet.
    ///
    /// Returns `true` if the connection changed.
    pub fn apply_event(&mut self, event: &WalletEvent) -> bool {
        let Some(connection) = self.connection else {
            return false;
        };

        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&address) if address == connection.address => false,
                Some(&address) => {
                    info!(from = %connection.address, to = %address, "wallet account changed");
                    self.connection = Some(Connection {
                        address,
                        ..connection
                    });
                    true
                }
                None => {
                    warn!("wallet exposed no accounts, treating as disconnected");
                    self.connection = None;
                    true
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                if connection.chain_id == *chain_id {
                    return false;
                }
                info!(chain = %EvmChain::from_id(*chain_id), "wallet chain changed");
                self.connection = Some(Connection {
                    chain_id: *chain_id,
                    ..connection
                });
                true
            }
            WalletEvent::Disconnect => {
                warn!("wallet reported disconnect");
                self.connection = None;
                true
            }
        }
    }
}
