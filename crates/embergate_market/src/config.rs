//! # Client Configuration
//!
//! Loaded once at startup from a TOML file, with complete defaults so the
//! client also runs configuration-free against the stock deployment.

use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::error::{MarketError, MarketResult};

/// Deployed escrow market used when no config overrides it.
const DEFAULT_ESCROW_ADDRESS: &str = "0x0896Ec6E48479508FD119C2b3C4A6e93C7b1C8E8";

/// Deployed relic token used when no config overrides it.
const DEFAULT_TOKEN_ADDRESS: &str = "0x87983e46B33783Eea3e51d4ab2fc937Ac73D4290";

/// Client configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Address of the escrow market contract.
    pub escrow_address: Address,
    /// Address of the relic token contract.
    pub token_address: Address,
    /// Fixed upper bound of slot indices a scan visits.
    pub max_slots: u64,
    /// Gateway prefix substituted for `ipfs://`.
    pub ipfs_gateway: String,
    /// Per-request timeout for metadata fetches, in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            escrow_address: DEFAULT_ESCROW_ADDRESS.parse().expect("valid address"),
            token_address: DEFAULT_TOKEN_ADDRESS.parse().expect("valid address"),
            max_slots: 10,
            ipfs_gateway: "https://ipfs.io/ipfs/".to_string(),
            fetch_timeout_ms: 5_000,
        }
    }
}

impl MarketConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> MarketResult<Self> {
        toml::from_str(text).map_err(|error| MarketError::InvalidConfig(error.to_string()))
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> MarketResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|error| MarketError::InvalidConfig(error.to_string()))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = MarketConfig::default();
        assert_eq!(config.max_slots, 10);
        assert_eq!(config.ipfs_gateway, "https://ipfs.io/ipfs/");
        assert_ne!(config.escrow_address, Address::ZERO);
        assert_ne!(config.token_address, Address::ZERO);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = MarketConfig::from_toml_str("max_slots = 25\n").unwrap();
        assert_eq!(config.max_slots, 25);
        assert_eq!(config.ipfs_gateway, MarketConfig::default().ipfs_gateway);
    }

    #[test]
    fn test_full_toml_overrides() {
        let text = r#"
escrow_address = "0x0000000000000000000000000000000000000001"
token_address = "0x0000000000000000000000000000000000000002"
max_slots = 50
ipfs_gateway = "https://gateway.example/ipfs/"
fetch_timeout_ms = 250
"#;
        let config = MarketConfig::from_toml_str(text).unwrap();
        assert_eq!(config.escrow_address, Address::with_last_byte(1));
        assert_eq!(config.token_address, Address::with_last_byte(2));
        assert_eq!(config.fetch_timeout_ms, 250);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_addresses() {
        assert!(matches!(
            MarketConfig::from_toml_str("max_slot = 5\n"),
            Err(MarketError::InvalidConfig(_))
        ));
        assert!(matches!(
            MarketConfig::from_toml_str("escrow_address = \"not-an-address\"\n"),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            MarketConfig::load("/definitely/not/here.toml"),
            Err(MarketError::InvalidConfig(_))
        ));
    }
}
