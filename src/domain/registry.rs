//! Static chain metadata table.

use alloy_primitives::{address, Address};

use super::chain::{Chain, ChainDescriptor, NativeCurrency};

/// Canonical Multicall3 deployment.
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

const ETH: NativeCurrency = NativeCurrency {
    symbol: "ETH",
    decimals: 18,
};

const fn native(symbol: &'static str) -> NativeCurrency {
    NativeCurrency {
        symbol,
        decimals: 18,
    }
}

static CHAINS: [ChainDescriptor; 20] = [
    ChainDescriptor {
        chain: Chain::Ethereum,
        rpc_urls: &["https://ethereum.publicnode.com"],
        explorer_tx_url: "https://etherscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")),
        multicall: MULTICALL3,
        token_list_slug: Some("ethereum"),
        price_slug: "ethereum",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Arbitrum,
        rpc_urls: &["https://arbitrum-one.publicnode.com", "https://arb1.arbitrum.io/rpc"],
        explorer_tx_url: "https://arbiscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1")),
        multicall: MULTICALL3,
        token_list_slug: Some("arbitrum-one"),
        price_slug: "arbitrum",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Optimism,
        rpc_urls: &["https://mainnet.optimism.io", "https://optimism-rpc.publicnode.com"],
        explorer_tx_url: "https://optimistic.etherscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("4200000000000000000000000000000000000006")),
        multicall: MULTICALL3,
        token_list_slug: Some("optimistic-ethereum"),
        price_slug: "optimism",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Base,
        rpc_urls: &["https://mainnet.base.org"],
        explorer_tx_url: "https://basescan.org/tx/",
        native: ETH,
        wrapped_native: Some(address!("4200000000000000000000000000000000000006")),
        multicall: MULTICALL3,
        token_list_slug: Some("base"),
        price_slug: "base",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Linea,
        rpc_urls: &["https://rpc.linea.build"],
        explorer_tx_url: "https://lineascan.build/tx/",
        native: ETH,
        wrapped_native: Some(address!("e5D7C2a44FfDDf6b295A15c148167daaAf5Cf34f")),
        multicall: MULTICALL3,
        token_list_slug: Some("linea"),
        price_slug: "linea",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Zksync,
        rpc_urls: &["https://mainnet.era.zksync.io"],
        explorer_tx_url: "https://era.zksync.network/tx/",
        native: ETH,
        wrapped_native: Some(address!("5AEa5775959fBC2557Cc8789bC1bf90A239D9a91")),
        multicall: address!("b1F9b5FCD56122CdfD7086e017ec63E50dC075e7"),
        token_list_slug: Some("zksync"),
        price_slug: "era",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Bsc,
        rpc_urls: &["https://bsc-dataseed.bnbchain.org"],
        explorer_tx_url: "https://bscscan.com/tx/",
        native: native("BNB"),
        wrapped_native: Some(address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c")),
        multicall: MULTICALL3,
        token_list_slug: Some("binance-smart-chain"),
        price_slug: "bsc",
        native_price_id: "binancecoin",
    },
    ChainDescriptor {
        chain: Chain::Opbnb,
        rpc_urls: &["https://opbnb-mainnet-rpc.bnbchain.org"],
        explorer_tx_url: "https://opbnbscan.com/tx/",
        native: native("BNB"),
        wrapped_native: Some(address!("4200000000000000000000000000000000000006")),
        multicall: MULTICALL3,
        token_list_slug: Some("opbnb"),
        price_slug: "op_bnb",
        native_price_id: "binancecoin",
    },
    ChainDescriptor {
        chain: Chain::Polygon,
        rpc_urls: &["https://polygon-rpc.com"],
        explorer_tx_url: "https://polygonscan.com/tx/",
        native: native("POL"),
        wrapped_native: Some(address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270")),
        multicall: MULTICALL3,
        token_list_slug: Some("polygon-pos"),
        price_slug: "polygon",
        native_price_id: "matic-network",
    },
    ChainDescriptor {
        chain: Chain::Avalanche,
        rpc_urls: &[
            "https://avalanche-c-chain-rpc.publicnode.com",
            "https://avalanche.drpc.org",
        ],
        explorer_tx_url: "https://snowtrace.io/tx/",
        native: native("AVAX"),
        wrapped_native: Some(address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7")),
        multicall: MULTICALL3,
        token_list_slug: Some("avalanche"),
        price_slug: "avax",
        native_price_id: "avalanche-2",
    },
    ChainDescriptor {
        chain: Chain::Scroll,
        rpc_urls: &["https://rpc.scroll.io"],
        explorer_tx_url: "https://scrollscan.com/tx/",
        native: ETH,
        wrapped_native: Some(address!("5300000000000000000000000000000000000004")),
        multicall: MULTICALL3,
        token_list_slug: Some("scroll"),
        price_slug: "scroll",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Blast,
        rpc_urls: &["https://rpc.blast.io"],
        explorer_tx_url: "https://blastscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("4300000000000000000000000000000000000004")),
        multicall: MULTICALL3,
        token_list_slug: Some("blast"),
        price_slug: "blast",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Mantle,
        rpc_urls: &["https://rpc.mantle.xyz"],
        explorer_tx_url: "https://mantlescan.info/tx/",
        native: native("MNT"),
        wrapped_native: Some(address!("78c1b0C915c4FAA5FffA6CAbf0219DA63d7f4cb8")),
        multicall: MULTICALL3,
        token_list_slug: Some("mantle"),
        price_slug: "mantle",
        native_price_id: "mantle",
    },
    ChainDescriptor {
        chain: Chain::Gnosis,
        rpc_urls: &["https://rpc.gnosischain.com", "https://rpc.gnosis.gateway.fm"],
        explorer_tx_url: "https://gnosisscan.io/tx/",
        native: native("xDAI"),
        wrapped_native: Some(address!("e91D153E0b41518A2Ce8Dd3D7944Fa863463a97d")),
        multicall: MULTICALL3,
        token_list_slug: Some("xdai"),
        price_slug: "xdai",
        native_price_id: "xdai",
    },
    ChainDescriptor {
        chain: Chain::Fantom,
        rpc_urls: &["https://rpc.fantom.network"],
        explorer_tx_url: "https://ftmscan.com/tx/",
        native: native("FTM"),
        wrapped_native: Some(address!("21be370D5312f44cB42ce377BC9b8a0cEF1A4C83")),
        multicall: MULTICALL3,
        token_list_slug: Some("fantom"),
        price_slug: "fantom",
        native_price_id: "fantom",
    },
    ChainDescriptor {
        chain: Chain::Nova,
        rpc_urls: &["https://arbitrum-nova-rpc.publicnode.com"],
        explorer_tx_url: "https://nova.arbiscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("722E8BdD2ce80A4422E880164f2079488e115365")),
        multicall: MULTICALL3,
        token_list_slug: Some("arbitrum-nova"),
        price_slug: "arbitrum_nova",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Taiko,
        rpc_urls: &["https://rpc.taiko.xyz"],
        explorer_tx_url: "https://taikoscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("A51894664A773981C6C112C43ce576f315d5b1B6")),
        multicall: MULTICALL3,
        token_list_slug: None,
        price_slug: "taiko",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Core,
        rpc_urls: &["https://rpc.coredao.org"],
        explorer_tx_url: "https://scan.coredao.org/tx/",
        native: native("CORE"),
        wrapped_native: Some(address!("40375C92d9FAf44d2f9db9Bd9ba41a3317a2404f")),
        multicall: MULTICALL3,
        token_list_slug: Some("core"),
        price_slug: "core",
        native_price_id: "coredaoorg",
    },
    ChainDescriptor {
        chain: Chain::Manta,
        rpc_urls: &["https://manta-pacific.drpc.org"],
        explorer_tx_url: "https://manta.socialscan.io/tx/",
        native: ETH,
        wrapped_native: Some(address!("0Dc808adcE2099A9F62AA87D9670745AbA741746")),
        multicall: MULTICALL3,
        token_list_slug: None,
        price_slug: "manta",
        native_price_id: "ethereum",
    },
    ChainDescriptor {
        chain: Chain::Celo,
        rpc_urls: &["https://forno.celo.org"],
        explorer_tx_url: "https://celoscan.io/tx/",
        native: native("CELO"),
        // CELO is itself an ERC-20; there is no wrapper to unwrap.
        wrapped_native: None,
        multicall: MULTICALL3,
        token_list_slug: Some("celo"),
        price_slug: "celo",
        native_price_id: "celo",
    },
];

/// Descriptor for `chain`.
#[must_use]
pub fn descriptor(chain: Chain) -> &'static ChainDescriptor {
    // Table order matches `Chain::ALL`.
    let index = Chain::ALL
        .iter()
        .position(|c| *c == chain)
        .unwrap_or_default();
    &CHAINS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_aligned_with_chain_enum() {
        for chain in Chain::ALL {
            assert_eq!(descriptor(chain).chain, chain);
        }
    }

    #[test]
    fn every_chain_has_rpc_and_explorer() {
        for chain in Chain::ALL {
            let d = descriptor(chain);
            assert!(d.rpc_url().starts_with("https://"), "{chain}");
            assert!(d.tx_link("0xabc").ends_with("/tx/0xabc"), "{chain}");
        }
    }

    #[test]
    fn celo_has_no_wrapped_native() {
        assert!(descriptor(Chain::Celo).wrapped_native.is_none());
        assert!(descriptor(Chain::Base).wrapped_native.is_some());
    }
}
