//! Token discovery from CoinGecko token lists and Multicall3 balance scans.
//!
//! Lists are fetched once per chain and kept for the lifetime of the adapter.
//! Balances are read in Multicall3 batches with per-call failure allowed, so
//! one broken token contract does not hide the rest.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::ProviderBuilder;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::adapter::outbound::evm::contracts::IMulticall3::{self, Call3, Call3Result};
use crate::adapter::outbound::evm::contracts::IERC20;
use crate::adapter::outbound::http::send_json;
use crate::domain::chain::Chain;
use crate::domain::token::{is_native_address, Asset, Token, TokenBalance};
use crate::error::{Error, Result};
use crate::port::outbound::discovery::TokenDiscovery;

const LIST_BASE_URL: &str = "https://tokens.coingecko.com";

/// Calls per `aggregate3`.
const MULTICALL_BATCH: usize = 500;

#[derive(Debug, Deserialize)]
struct TokenListReply {
    #[serde(default)]
    tokens: Vec<ListedToken>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedToken {
    chain_id: u64,
    address: Address,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    decimals: u8,
}

impl ListedToken {
    fn token(&self) -> Token {
        Token {
            asset: Asset::Erc20(self.address),
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            decimals: self.decimals,
        }
    }
}

/// Token-list backed [`TokenDiscovery`].
pub struct TokenListDiscovery {
    http: HttpClient,
    lists: Mutex<HashMap<Chain, Arc<Vec<ListedToken>>>>,
}

impl TokenListDiscovery {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            lists: Mutex::new(HashMap::new()),
        }
    }

    async fn token_list(&self, chain: Chain) -> Result<Arc<Vec<ListedToken>>> {
        if let Some(list) = self.lists.lock().get(&chain).cloned() {
            return Ok(list);
        }
        let Some(slug) = chain.descriptor().token_list_slug else {
            return Ok(Arc::new(Vec::new()));
        };
        let url = format!("{LIST_BASE_URL}/{slug}/all.json");
        let reply: TokenListReply = send_json(self.http.get(&url)).await?;
        let list = Arc::new(filter_list(chain, reply.tokens));
        info!(chain = %chain, tokens = list.len(), "Fetched token list");
        self.lists.lock().insert(chain, list.clone());
        Ok(list)
    }

    async fn aggregate(chain: Chain, calls: Vec<Call3>) -> Result<Vec<Call3Result>> {
        let descriptor = chain.descriptor();
        let url = Url::parse(descriptor.rpc_url())?;
        let provider = ProviderBuilder::new().connect_http(url);
        let multicall = IMulticall3::new(descriptor.multicall, &provider);
        let mut results = Vec::with_capacity(calls.len());
        for batch in calls.chunks(MULTICALL_BATCH) {
            let answered = multicall
                .aggregate3(batch.to_vec())
                .call()
                .await
                .map_err(|e| Error::Rpc(format!("aggregate3: {e}")))?;
            results.extend(answered);
        }
        Ok(results)
    }

    /// Read `decimals`, `symbol` and `name` for tokens missing from the list.
    async fn metadata(chain: Chain, tokens: &[Address]) -> Result<Vec<ListedToken>> {
        let calls = tokens
            .iter()
            .flat_map(|token| {
                [
                    IERC20::decimalsCall {}.abi_encode(),
                    IERC20::symbolCall {}.abi_encode(),
                    IERC20::nameCall {}.abi_encode(),
                ]
                .map(|data| call3(*token, data))
            })
            .collect();
        let results = Self::aggregate(chain, calls).await?;

        let mut found = Vec::with_capacity(tokens.len());
        for (token, answers) in tokens.iter().zip(results.chunks(3)) {
            let [decimals, symbol, name] = answers else {
                continue;
            };
            let Some(decimals) = decode::<IERC20::decimalsCall>(decimals) else {
                warn!(chain = %chain, token = %token, "Token has no decimals, skipping");
                continue;
            };
            found.push(ListedToken {
                chain_id: chain.id(),
                address: *token,
                symbol: decode::<IERC20::symbolCall>(symbol).unwrap_or_default(),
                name: decode::<IERC20::nameCall>(name).unwrap_or_default(),
                decimals,
            });
        }
        Ok(found)
    }
}

fn call3(target: Address, data: Vec<u8>) -> Call3 {
    Call3 {
        target,
        allowFailure: true,
        callData: Bytes::from(data),
    }
}

fn decode<C: SolCall>(result: &Call3Result) -> Option<C::Return> {
    if !result.success {
        return None;
    }
    C::abi_decode_returns(&result.returnData).ok()
}

/// Entries of a list that belong to `chain` and are real ERC-20 contracts.
fn filter_list(chain: Chain, tokens: Vec<ListedToken>) -> Vec<ListedToken> {
    tokens
        .into_iter()
        .filter(|t| t.chain_id == chain.id() && !is_native_address(chain, t.address))
        .collect()
}

/// Pair each token with its decoded balance, keeping non-zero ones.
fn nonzero(tokens: &[ListedToken], results: &[Call3Result]) -> Vec<TokenBalance> {
    tokens
        .iter()
        .zip(results)
        .filter_map(|(listed, result)| {
            let balance: U256 = decode::<IERC20::balanceOfCall>(result)?;
            (!balance.is_zero()).then(|| TokenBalance {
                token: listed.token(),
                balance,
            })
        })
        .collect()
}

#[async_trait]
impl TokenDiscovery for TokenListDiscovery {
    async fn nonzero_balances(&self, chain: Chain, wallet: Address, extra: &[Address]) -> Result<Vec<TokenBalance>> {
        let list = self.token_list(chain).await?;
        let unlisted: Vec<Address> = extra
            .iter()
            .copied()
            .filter(|address| !is_native_address(chain, *address))
            .filter(|address| !list.iter().any(|t| t.address == *address))
            .collect();

        let mut tokens: Vec<ListedToken> = list.iter().cloned().collect();
        if !unlisted.is_empty() {
            tokens.extend(Self::metadata(chain, &unlisted).await?);
        }
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let calls = tokens
            .iter()
            .map(|t| call3(t.address, IERC20::balanceOfCall { account: wallet }.abi_encode()))
            .collect();
        let results = Self::aggregate(chain, calls).await?;
        let found = nonzero(&tokens, &results);
        debug!(chain = %chain, wallet = %wallet, scanned = tokens.len(), nonzero = found.len(), "Balance scan");
        Ok(found)
    }
}
