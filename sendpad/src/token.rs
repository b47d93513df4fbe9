//! Assets the front end can show and send.
//!
//! A [`TokenList`] always starts with the chain's native coin, followed by
//! the configured ERC-20 contracts.

use std::fmt;

use alloy::primitives::Address;

use crate::config::{AppConfig, ConfigError};

/// Decimal places of every EVM native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// What a balance query or transfer operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// The chain's native coin.
    Native,
    /// An ERC-20 token contract.
    Erc20(Address),
}

impl Asset {
    /// The token contract, if this is an ERC-20.
    #[must_use]
    pub const fn contract(&self) -> Option<Address> {
        match self {
            Self::Native => None,
            Self::Erc20(address) => Some(*address),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Erc20(address) => write!(f, "erc20:{address}"),
        }
    }
}

/// A selectable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Ticker shown in the UI and used for selection.
    pub symbol: String,
    /// Native coin or contract.
    pub asset: Asset,
    /// Decimal places; `None` until read from the contract.
    pub decimals: Option<u8>,
}

impl TokenInfo {
    /// The native coin of a chain.
    #[must_use]
    pub fn native(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            asset: Asset::Native,
            decimals: Some(NATIVE_DECIMALS),
        }
    }

    /// An ERC-20 token.
    #[must_use]
    pub fn erc20(symbol: impl Into<String>, address: Address, decimals: Option<u8>) -> Self {
        Self {
            symbol: symbol.into(),
            asset: Asset::Erc20(address),
            decimals,
        }
    }

    /// Whether this is the native coin.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self.asset, Asset::Native)
    }
}

/// The assets offered in the token selector, native coin first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<TokenInfo>,
}

impl TokenList {
    /// Build a list from the native coin's symbol and a set of ERC-20 tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if two entries share a symbol
    /// (case-insensitively), or if a non-native entry is passed as native.
    pub fn new(native_symbol: &str, tokens: Vec<TokenInfo>) -> Result<Self, ConfigError> {
        let mut list = vec![TokenInfo::native(native_symbol)];
        for token in tokens {
            if token.is_native() {
                return Err(ConfigError::InvalidValue(format!(
                    "token '{}' must have a contract address",
                    token.symbol
                )));
            }
            if list
                .iter()
                .any(|t| t.symbol.eq_ignore_ascii_case(&token.symbol))
            {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate token symbol '{}'",
                    token.symbol
                )));
            }
            list.push(token);
        }
        Ok(Self { tokens: list })
    }

    /// Build the list described by a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a token address is invalid or symbols collide.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let tokens = config
            .tokens
            .iter()
            .map(|t| {
                let address: Address = t.address.parse().map_err(|e| {
                    ConfigError::InvalidValue(format!("token '{}' address: {e}", t.symbol))
                })?;
                Ok(TokenInfo::erc20(&t.symbol, address, t.decimals))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::new(&config.native_symbol(), tokens)
    }

    /// The native coin entry.
    #[must_use]
    pub fn native(&self) -> &TokenInfo {
        &self.tokens[0]
    }

    /// Find a token by symbol, ignoring case.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Record decimals learned from the contract.
    pub fn set_decimals(&mut self, symbol: &str, decimals: u8) {
        if let Some(token) = self
            .tokens
            .iter_mut()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        {
            token.decimals = Some(decimals);
        }
    }

    /// Iterate in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.iter()
    }

    /// Number of entries, native coin included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`: the native coin is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

    #[test]
    fn native_comes_first() {
        let list = TokenList::new("ETH", vec![TokenInfo::erc20("USDC", USDC, Some(6))]).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.native().is_native());
        assert_eq!(list.native().decimals, Some(18));
        assert_eq!(list.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(), ["ETH", "USDC"]);
    }

    #[test]
    fn lookup_ignores_case() {
        let list = TokenList::new("ETH", vec![TokenInfo::erc20("USDC", USDC, None)]).unwrap();
        assert_eq!(list.get("usdc").unwrap().asset, Asset::Erc20(USDC));
        assert!(list.get("DAI").is_none());
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let err = TokenList::new("ETH", vec![TokenInfo::erc20("eth", USDC, None)]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_native_entries() {
        assert!(TokenList::new("ETH", vec![TokenInfo::native("WETH")]).is_err());
    }

    #[test]
    fn learns_decimals() {
        let mut list = TokenList::new("ETH", vec![TokenInfo::erc20("USDC", USDC, None)]).unwrap();
        list.set_decimals("USDC", 6);
        assert_eq!(list.get("USDC").unwrap().decimals, Some(6));
    }

    #[test]
    fn from_default_config() {
        let list = TokenList::from_config(&AppConfig::default()).unwrap();
        assert_eq!(list.native().symbol, "tBNB");
        let busd = list.get("busd").unwrap();
        assert_eq!(
            busd.asset,
            Asset::Erc20(address!("337610d27c682E347C9cD60BD4b3b107C9d34dDd"))
        );
        assert_eq!(busd.decimals, Some(18));
    }

    #[test]
    fn asset_contract() {
        assert_eq!(Asset::Native.contract(), None);
        assert_eq!(Asset::Erc20(USDC).contract(), Some(USDC));
    }
}
