//! Chain identifiers and their static descriptor records.
//!
//! The descriptor table itself lives in [`super::registry`]; this module
//! defines the closed set of supported chains and the shape of a record.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Supported EVM chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Chain {
    Ethereum,
    Arbitrum,
    Optimism,
    Base,
    Linea,
    Zksync,
    Bsc,
    Opbnb,
    Polygon,
    Avalanche,
    Scroll,
    Blast,
    Mantle,
    Gnosis,
    Fantom,
    Nova,
    Taiko,
    Core,
    Manta,
    Celo,
}

impl Chain {
    /// Every supported chain, in table order.
    pub const ALL: [Chain; 20] = [
        Chain::Ethereum,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Base,
        Chain::Linea,
        Chain::Zksync,
        Chain::Bsc,
        Chain::Opbnb,
        Chain::Polygon,
        Chain::Avalanche,
        Chain::Scroll,
        Chain::Blast,
        Chain::Mantle,
        Chain::Gnosis,
        Chain::Fantom,
        Chain::Nova,
        Chain::Taiko,
        Chain::Core,
        Chain::Manta,
        Chain::Celo,
    ];

    /// Display name, as written in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Arbitrum => "Arbitrum",
            Chain::Optimism => "Optimism",
            Chain::Base => "Base",
            Chain::Linea => "Linea",
            Chain::Zksync => "Zksync",
            Chain::Bsc => "Bsc",
            Chain::Opbnb => "Opbnb",
            Chain::Polygon => "Polygon",
            Chain::Avalanche => "Avalanche",
            Chain::Scroll => "Scroll",
            Chain::Blast => "Blast",
            Chain::Mantle => "Mantle",
            Chain::Gnosis => "Gnosis",
            Chain::Fantom => "Fantom",
            Chain::Nova => "Nova",
            Chain::Taiko => "Taiko",
            Chain::Core => "Core",
            Chain::Manta => "Manta",
            Chain::Celo => "Celo",
        }
    }

    /// EIP-155 chain id.
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Arbitrum => 42161,
            Chain::Optimism => 10,
            Chain::Base => 8453,
            Chain::Linea => 59144,
            Chain::Zksync => 324,
            Chain::Bsc => 56,
            Chain::Opbnb => 204,
            Chain::Polygon => 137,
            Chain::Avalanche => 43114,
            Chain::Scroll => 534352,
            Chain::Blast => 81457,
            Chain::Mantle => 5000,
            Chain::Gnosis => 100,
            Chain::Fantom => 250,
            Chain::Nova => 42170,
            Chain::Taiko => 167000,
            Chain::Core => 1116,
            Chain::Manta => 169,
            Chain::Celo => 42220,
        }
    }

    /// Static metadata record.
    #[must_use]
    pub fn descriptor(self) -> &'static ChainDescriptor {
        super::registry::descriptor(self)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Chain::ALL
            .into_iter()
            .find(|chain| chain.name().to_lowercase() == needle)
            .ok_or_else(|| ConfigError::UnknownChain(s.trim().to_string()))
    }
}

impl TryFrom<String> for Chain {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.name().to_string()
    }
}

/// Native coin metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Fixed, read-only metadata for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub chain: Chain,
    pub rpc_urls: &'static [&'static str],
    /// Explorer prefix; a transaction hash is appended to form a link.
    pub explorer_tx_url: &'static str,
    pub native: NativeCurrency,
    /// Wrapped native token, if the chain has a real wrapper contract.
    pub wrapped_native: Option<Address>,
    pub multicall: Address,
    /// Slug used by the token list service, if the chain is listed there.
    pub token_list_slug: Option<&'static str>,
    /// Chain key used by the price service.
    pub price_slug: &'static str,
    /// Price-service id of the native coin.
    pub native_price_id: &'static str,
}

impl ChainDescriptor {
    /// Explorer link for a transaction hash.
    #[must_use]
    pub fn tx_link(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }

    /// Primary RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> &'static str {
        self.rpc_urls.first().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively_and_trims() {
        assert_eq!(" LINEA ".parse::<Chain>().unwrap(), Chain::Linea);
        assert_eq!("zksync".parse::<Chain>().unwrap(), Chain::Zksync);
    }

    #[test]
    fn unknown_chain_is_config_error() {
        let err = "Solana".parse::<Chain>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChain(name) if name == "Solana"));
    }

    #[test]
    fn chain_ids_are_unique() {
        let mut ids: Vec<u64> = Chain::ALL.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Chain::ALL.len());
    }
}
