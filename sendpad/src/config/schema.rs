//! Configuration schema definitions.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::wallet::EvmChain;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Chain the front end works on.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where the wallet is reached.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// ERC-20 tokens offered next to the native coin.
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenConfig>,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Chain ID the wallet must be on to send.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Display name override.
    #[serde(default)]
    pub name: Option<String>,
    /// JSON-RPC endpoint for balance reads.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Native coin ticker override.
    #[serde(default)]
    pub native_symbol: Option<String>,
}

const fn default_chain_id() -> u64 {
    97
}

fn default_rpc_url() -> String {
    "https://data-seed-prebsc-1-s1.bnbchain.org:8545".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            name: None,
            rpc_url: default_rpc_url(),
            native_symbol: None,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    /// EIP-1193 endpoint (JSON-RPC over HTTP).
    #[serde(default = "default_wallet_endpoint")]
    pub endpoint: String,
    /// Switch the wallet to the configured chain before sending.
    #[serde(default = "default_true")]
    pub auto_switch_chain: bool,
}

fn default_wallet_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            endpoint: default_wallet_endpoint(),
            auto_switch_chain: true,
        }
    }
}

/// One ERC-20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Ticker.
    pub symbol: String,
    /// Contract address.
    pub address: String,
    /// Decimal places; read from the contract when omitted.
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// BUSD on BSC testnet.
fn default_tokens() -> Vec<TokenConfig> {
    vec![TokenConfig {
        symbol: "BUSD".to_string(),
        address: "0x337610d27c682E347C9cD60BD4b3b107C9d34dDd".to_string(),
        decimals: Some(18),
    }]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            wallet: WalletConfig::default(),
            tokens: default_tokens(),
        }
    }
}

impl AppConfig {
    /// The configured chain.
    #[must_use]
    pub fn chain(&self) -> EvmChain {
        let known = EvmChain::from_id(self.network.chain_id);
        match (&self.network.name, &self.network.native_symbol) {
            (None, None) => known,
            (name, symbol) => EvmChain::Custom {
                id: self.network.chain_id,
                name: name.clone().unwrap_or_else(|| known.name().to_owned()),
                native_symbol: symbol
                    .clone()
                    .unwrap_or_else(|| known.native_symbol().to_owned()),
            },
        }
    }

    /// Ticker of the native coin.
    #[must_use]
    pub fn native_symbol(&self) -> String {
        self.chain().native_symbol().to_owned()
    }

    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.network.chain_id == 0 {
            issues.push(ConfigIssue::error("network.chain_id", "Chain ID must not be 0"));
        }

        for (field, url) in [
            ("network.rpc_url", &self.network.rpc_url),
            ("wallet.endpoint", &self.wallet.endpoint),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                issues.push(ConfigIssue::error(
                    field,
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }

        if self.tokens.is_empty() {
            issues.push(ConfigIssue::warning(
                "tokens",
                "No ERC-20 token configured, only the native coin is available",
            ));
        }

        let native = self.native_symbol();
        for (i, token) in self.tokens.iter().enumerate() {
            let path = format!("tokens[{i}]");
            if token.symbol.trim().is_empty() {
                issues.push(ConfigIssue::error(&path, "Token symbol must not be empty"));
            }
            if token.address.parse::<Address>().is_err() {
                issues.push(ConfigIssue::error(
                    &path,
                    format!("'{}' is not a valid address", token.address),
                ));
            }
            if token.decimals.is_some_and(|d| d > 77) {
                issues.push(ConfigIssue::error(&path, "Decimals must be at most 77"));
            }
            let clashes = token.symbol.eq_ignore_ascii_case(&native)
                || self.tokens[..i]
                    .iter()
                    .any(|t| t.symbol.eq_ignore_ascii_case(&token.symbol));
            if clashes {
                issues.push(ConfigIssue::error(
                    &path,
                    format!("Duplicate symbol '{}'", token.symbol),
                ));
            }
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("SENDPAD_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Ok(endpoint) = std::env::var("SENDPAD_WALLET_ENDPOINT") {
            self.wallet.endpoint = endpoint;
        }
        self
    }
}

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "network.rpc_url").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Error that prevents the front end from working.
    Error,
    /// Warning about potential issues.
    Warning,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network.chain_id, 97);
        assert_eq!(config.chain(), EvmChain::BscTestnet);
        assert_eq!(config.native_symbol(), "tBNB");
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].symbol, "BUSD");
        assert_eq!(config.tokens[0].decimals, Some(18));
        assert!(config.is_valid());
        assert!(config.wallet.auto_switch_chain);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.network.rpc_url, config.network.rpc_url);
        assert_eq!(parsed.tokens, config.tokens);
    }

    #[test]
    fn test_parse_sample_config() {
        let toml_str = r#"
[network]
chain_id = 137
rpc_url = "https://polygon-rpc.com"

[wallet]
endpoint = "http://127.0.0.1:1248"

[[tokens]]
symbol = "USDT"
address = "0xc2132D05D31c914a87C6611C10748AEb04B58e8F"
"#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chain(), EvmChain::Polygon);
        assert_eq!(config.native_symbol(), "POL");
        assert_eq!(config.wallet.endpoint, "http://127.0.0.1:1248");
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].decimals, None);
        assert!(config.is_valid());
    }

    #[test]
    fn test_missing_tokens_use_default() {
        let config: AppConfig = toml::from_str("[network]\nchain_id = 97\n").unwrap();
        assert_eq!(config.tokens[0].symbol, "BUSD");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(toml::from_str::<AppConfig>("[network]\nchainid = 1\n").is_err());
    }

    #[test]
    fn test_custom_name_and_symbol() {
        let mut config = AppConfig::default();
        config.network.chain_id = 31_337;
        config.network.native_symbol = Some("GO".into());
        let chain = config.chain();
        assert_eq!(chain.id(), 31_337);
        assert_eq!(chain.name(), "local");
        assert_eq!(chain.native_symbol(), "GO");
    }

    #[test]
    fn test_validation() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should have no issues");
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation_bad_address_and_duplicate() {
        let mut config = AppConfig::default();
        config.tokens.push(TokenConfig {
            symbol: "usdc".into(),
            address: "0x1234".into(),
            decimals: None,
        });
        let issues = config.validate();
        assert!(!config.is_valid());
        assert!(issues.iter().any(|i| i.message.contains("not a valid address")));
        assert!(issues.iter().any(|i| i.message.contains("Duplicate")));
    }

    #[test]
    fn test_validation_bad_urls() {
        let mut config = AppConfig::default();
        config.wallet.endpoint = "ws://localhost".into();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "wallet.endpoint");
        assert_eq!(issues[0].level, IssueLevel::Error);
    }

    #[test]
    fn test_validation_no_tokens_is_warning() {
        let mut config = AppConfig::default();
        config.tokens.clear();
        assert!(config.is_valid());
        assert_eq!(config.validate()[0].level, IssueLevel::Warning);
    }
}
