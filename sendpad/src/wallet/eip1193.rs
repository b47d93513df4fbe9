//! The EIP-1193 request surface.
//!
//! An injected wallet exposes a single `request({ method, params })` entry
//! point plus a handful of events. [`Eip1193`] is that entry point; anything
//! that can carry a request to a wallet (a browser binding, an HTTP endpoint,
//! a test double) implements it.

use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WalletError;

/// Method names used by the connector.
pub mod methods {
    /// Ask the wallet to expose accounts, prompting the user if needed.
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    /// Read already-authorized accounts without prompting.
    pub const ACCOUNTS: &str = "eth_accounts";
    /// Current chain ID as a hex quantity.
    pub const CHAIN_ID: &str = "eth_chainId";
    /// Ask the wallet to sign and broadcast a transaction.
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    /// Ask the wallet to switch its active chain.
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    /// Ask the wallet to add a chain it does not know yet.
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    /// Drop the permissions granted by `eth_requestAccounts`.
    pub const REVOKE_PERMISSIONS: &str = "wallet_revokePermissions";
}

/// A wallet reachable through EIP-1193 `request` calls.
#[async_trait]
pub trait Eip1193: Send + Sync + fmt::Debug {
    /// Send one request and return the raw JSON result.
    ///
    /// # Errors
    ///
    /// Returns the provider's error mapped to [`WalletError`], or a transport
    /// error if the request never reached the wallet.
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;
}

#[async_trait]
impl<T: Eip1193 + ?Sized> Eip1193 for std::sync::Arc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        (**self).request(method, params).await
    }
}

/// Transaction parameters handed to `eth_sendTransaction`.
///
/// Gas, fees and nonce are left to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    /// Sender; filled in by the connector from the connected account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient or contract address.
    pub to: Address,
    /// Native value in wei.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Calldata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

impl WalletTransaction {
    /// A plain native-coin transfer.
    #[must_use]
    pub const fn native(to: Address, value: U256) -> Self {
        Self {
            from: None,
            to,
            value: Some(value),
            data: None,
        }
    }

    /// A contract call carrying `data` and no value.
    #[must_use]
    pub const fn call(to: Address, data: Bytes) -> Self {
        Self {
            from: None,
            to,
            value: None,
            data: Some(data),
        }
    }
}

/// Events a wallet pushes to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// `accountsChanged`: the exposed accounts changed; empty means locked or revoked.
    AccountsChanged(Vec<Address>),
    /// `chainChanged`: the active chain changed.
    ChainChanged(u64),
    /// `disconnect`: the wallet lost its connection.
    Disconnect,
}

/// Parameters for `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Hex chain ID, e.g. `"0xaa36a7"`.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// RPC endpoints the wallet should use.
    pub rpc_urls: Vec<String>,
    /// Native currency description.
    pub native_currency: NativeCurrency,
}

/// Native currency entry of [`AddChainParams`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker.
    pub symbol: String,
    /// Decimal places, 18 for every EVM chain in practice.
    pub decimals: u8,
}

/// Format a chain ID as the hex quantity wallets expect.
#[must_use]
pub fn hex_chain_id(id: u64) -> String {
    format!("{id:#x}")
}

/// Parse a hex (or decimal) chain ID returned by `eth_chainId`.
///
/// # Errors
///
/// Returns [`WalletError::Decode`] when the value is not a chain ID.
pub fn parse_chain_id(value: &Value) -> Result<u64, WalletError> {
    match value {
        Value::String(s) => {
            let parsed = s.strip_prefix("0x").map_or_else(
                || s.parse::<u64>().ok(),
                |hex| u64::from_str_radix(hex, 16).ok(),
            );
            parsed.ok_or_else(|| WalletError::decode(format!("invalid chain id '{s}'")))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| WalletError::decode(format!("invalid chain id {n}"))),
        other => Err(WalletError::decode(format!("invalid chain id {other}"))),
    }
}

/// Parse the account list returned by `eth_requestAccounts` / `eth_accounts`.
///
/// # Errors
///
/// Returns [`WalletError::Decode`] when the result is not a list of addresses.
pub fn parse_accounts(value: Value) -> Result<Vec<Address>, WalletError> {
    serde_json::from_value(value)
        .map_err(|e| WalletError::decode(format!("invalid accounts list: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde_json::json;

    #[test]
    fn chain_id_roundtrips_through_hex() {
        assert_eq!(hex_chain_id(11_155_111), "0xaa36a7");
        assert_eq!(parse_chain_id(&json!("0xaa36a7")).unwrap(), 11_155_111);
        assert_eq!(parse_chain_id(&json!("1")).unwrap(), 1);
        assert_eq!(parse_chain_id(&json!(137)).unwrap(), 137);
    }

    #[test]
    fn chain_id_rejects_garbage() {
        assert!(parse_chain_id(&json!("0xzz")).is_err());
        assert!(parse_chain_id(&json!(null)).is_err());
    }

    #[test]
    fn accounts_parse_from_lowercase_hex() {
        let accounts =
            parse_accounts(json!(["0x70997970c51812dc3a010c7d01b50e0d17dc79c8"])).unwrap();
        assert_eq!(
            accounts,
            vec![address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")]
        );
        assert!(parse_accounts(json!("nope")).is_err());
    }

    #[test]
    fn native_transaction_serializes_without_data() {
        let to = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let tx = WalletTransaction::native(to, U256::from(1_000u64));
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["value"], json!("0x3e8"));
        assert!(value.get("data").is_none());
        assert!(value.get("from").is_none());
    }

    #[test]
    fn add_chain_params_use_camel_case() {
        let params = AddChainParams {
            chain_id: hex_chain_id(11_155_111),
            chain_name: "Sepolia".into(),
            rpc_urls: vec!["https://rpc.sepolia.org".into()],
            native_currency: NativeCurrency {
                name: "Sepolia Ether".into(),
                symbol: "ETH".into(),
                decimals: 18,
            },
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["chainId"], json!("0xaa36a7"));
        assert!(value["rpcUrls"].is_array());
        assert_eq!(value["nativeCurrency"]["decimals"], json!(18));
    }
}
