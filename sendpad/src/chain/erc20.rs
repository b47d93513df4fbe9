//! ERC-20 calldata encoding and decoding.
//!
//! Only the four functions the front end needs: `balanceOf`, `transfer`,
//! `decimals` and `symbol`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use super::ChainError;

/// Minimal ERC-20 ABI fragments for balance queries and transfers.
mod abi {
    alloy::sol! {
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// Calldata for `balanceOf(owner)`.
#[must_use]
pub fn balance_of_calldata(owner: Address) -> Bytes {
    Bytes::from(abi::balanceOfCall { owner }.abi_encode())
}

/// Calldata for `transfer(to, amount)`.
///
/// `amount` is the raw token amount (already scaled by the token's decimals).
#[must_use]
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    Bytes::from(abi::transferCall { to, amount }.abi_encode())
}

/// Calldata for `decimals()`.
#[must_use]
pub fn decimals_calldata() -> Bytes {
    Bytes::from(abi::decimalsCall {}.abi_encode())
}

/// Calldata for `symbol()`.
#[must_use]
pub fn symbol_calldata() -> Bytes {
    Bytes::from(abi::symbolCall {}.abi_encode())
}

/// Decode the return data of `balanceOf`.
///
/// # Errors
///
/// Returns [`ChainError::Decode`] if the data is not a `uint256`.
pub fn decode_balance(data: &[u8]) -> Result<U256, ChainError> {
    abi::balanceOfCall::abi_decode_returns(data)
        .map_err(|e| ChainError::decode(format!("ERC-20 balanceOf decode failed: {e}")))
}

/// Decode the return data of `decimals`.
///
/// # Errors
///
/// Returns [`ChainError::Decode`] if the data is not a `uint8`.
pub fn decode_decimals(data: &[u8]) -> Result<u8, ChainError> {
    abi::decimalsCall::abi_decode_returns(data)
        .map_err(|e| ChainError::decode(format!("ERC-20 decimals decode failed: {e}")))
}

/// Decode the return data of `symbol`.
///
/// # Errors
///
/// Returns [`ChainError::Decode`] if the data is not an ABI string.
pub fn decode_symbol(data: &[u8]) -> Result<String, ChainError> {
    abi::symbolCall::abi_decode_returns(data)
        .map_err(|e| ChainError::decode(format!("ERC-20 symbol decode failed: {e}")))
}
