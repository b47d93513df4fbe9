//! EIP-1193 over JSON-RPC 2.0 HTTP.
//!
//! Lets the connector talk to any endpoint that answers wallet methods over
//! HTTP: a development node with unlocked accounts, or a local bridge process
//! that forwards requests to a browser wallet. Envelopes, ids and error
//! payloads are handled by alloy's RPC client.

use alloy::rpc::client::{ClientBuilder, RpcClient};
use alloy::transports::http::reqwest;
use alloy::transports::{RpcError, TransportError, TransportErrorKind};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use super::WalletError;
use super::eip1193::Eip1193;

/// An [`Eip1193`] transport that posts JSON-RPC requests to an HTTP endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    client: RpcClient,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Transport`] if `endpoint` is not a valid URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, WalletError> {
        let endpoint = endpoint.into();
        let url: reqwest::Url = endpoint.parse().map_err(|e| {
            WalletError::transport(format!("invalid wallet endpoint '{endpoint}': {e}"))
        })?;
        Ok(Self {
            client: ClientBuilder::default().http(url),
            endpoint,
        })
    }

    /// The endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_error(&self, err: TransportError) -> WalletError {
        match err {
            RpcError::ErrorResp(payload) => WalletError::from_rpc(payload.code, payload.message),
            RpcError::Transport(kind) if is_unreachable(&kind) => {
                WalletError::unavailable(format!("no wallet at {}: {kind}", self.endpoint))
            }
            RpcError::Transport(kind) => WalletError::transport(kind.to_string()),
            RpcError::SerError(e) => WalletError::decode(e.to_string()),
            RpcError::DeserError { err, text } => {
                WalletError::decode(format!("invalid JSON-RPC response: {err}: {text}"))
            }
            other => WalletError::transport(other.to_string()),
        }
    }
}

/// Whether the endpoint could not be reached at all.
fn is_unreachable(kind: &TransportErrorKind) -> bool {
    match kind {
        TransportErrorKind::Custom(err) => err
            .downcast_ref::<reqwest::Error>()
            .is_some_and(|e| e.is_connect() || e.is_timeout()),
        TransportErrorKind::BackendGone => true,
        _ => false,
    }
}

#[async_trait]
impl Eip1193 for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        trace!(method, endpoint = %self.endpoint, "wallet request");

        let result = self
            .client
            .request::<_, Value>(method.to_owned(), params)
            .await
            .map_err(|e| self.map_error(e));
        if let Err(ref e) = result {
            debug!(method, error = %e, "wallet request failed");
        }
        result
    }
}
