//! JSON-RPC gateway: balances, gas, signing, submission and confirmation.
//!
//! Providers are built per call from the chain registry's RPC list. Reads
//! fall through the list until one endpoint answers; sends use the first
//! endpoint that accepts the transaction.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use alloy_provider::network::{Ethereum, EthereumWallet, Network, ReceiptResponse, TransactionBuilder};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::contracts::IERC20;
use crate::domain::chain::Chain;
use crate::domain::intent::TxIntent;
use crate::domain::token::Asset;
use crate::domain::wallet::WalletEntry;
use crate::error::{ConfigError, Error, ExecutionError, Result};
use crate::port::outbound::chain::{BalanceReader, GasEstimator, TransactionExecutor, TxStatus};

type TxRequest = <Ethereum as Network>::TransactionRequest;

/// Interval between receipt lookups while waiting for a transaction.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Chain access for every configured wallet.
pub struct EvmGateway {
    signers: HashMap<Address, PrivateKeySigner>,
    receipt_interval: Duration,
}

impl EvmGateway {
    /// # Errors
    ///
    /// Returns a configuration error if a private key is not a valid
    /// secp256k1 scalar.
    pub fn new(wallets: &[WalletEntry]) -> Result<Self> {
        let mut signers = HashMap::with_capacity(wallets.len());
        for (i, entry) in wallets.iter().enumerate() {
            let signer = PrivateKeySigner::from_bytes(&entry.private_key).map_err(|e| ConfigError::WalletEntry {
                line: i + 1,
                reason: e.to_string(),
            })?;
            signers.insert(signer.address(), signer);
        }
        Ok(Self {
            signers,
            receipt_interval: RECEIPT_POLL_INTERVAL,
        })
    }

    /// Gateway without signing keys, for read-only commands.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            signers: HashMap::new(),
            receipt_interval: RECEIPT_POLL_INTERVAL,
        }
    }

    fn endpoints(chain: Chain) -> Result<Vec<Url>> {
        chain
            .descriptor()
            .rpc_urls
            .iter()
            .map(|raw| Url::parse(raw).map_err(Error::from))
            .collect()
    }

    /// Run `op` against each endpoint of `chain` until one succeeds.
    async fn read<T, F, Fut>(&self, chain: Chain, label: &str, op: F) -> Result<T>
    where
        F: Fn(Url) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last = Error::Rpc(format!("{chain}: no RPC endpoint configured"));
        for url in Self::endpoints(chain)? {
            match op(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(chain = %chain, rpc = %url, call = label, error = %err, "RPC call failed");
                    last = err;
                }
            }
        }
        Err(last)
    }

    fn request(from: Address, intent: &TxIntent) -> TxRequest {
        let mut tx = TxRequest::default()
            .with_from(from)
            .with_to(intent.to)
            .with_value(intent.value)
            .with_input(intent.data.clone());
        if let Some(limit) = intent.gas_limit {
            tx.set_gas_limit(limit);
        }
        if let Some(price) = intent.gas_price {
            tx.set_gas_price(price);
        }
        tx
    }
}

#[async_trait]
impl BalanceReader for EvmGateway {
    async fn balance(&self, chain: Chain, wallet: Address, asset: Asset) -> Result<U256> {
        self.read(chain, "balance", |url| async move {
            let provider = ProviderBuilder::new().connect_http(url);
            match asset {
                Asset::Native => provider
                    .get_balance(wallet)
                    .await
                    .map_err(|e| rpc_error("get_balance", e)),
                Asset::Erc20(token) => IERC20::new(token, &provider)
                    .balanceOf(wallet)
                    .call()
                    .await
                    .map_err(|e| rpc_error("balanceOf", e)),
            }
        })
        .await
    }

    async fn allowance(&self, chain: Chain, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.read(chain, "allowance", |url| async move {
            let provider = ProviderBuilder::new().connect_http(url);
            IERC20::new(token, &provider)
                .allowance(owner, spender)
                .call()
                .await
                .map_err(|e| rpc_error("allowance", e))
        })
        .await
    }
}

#[async_trait]
impl GasEstimator for EvmGateway {
    async fn estimate_gas(&self, chain: Chain, from: Address, intent: &TxIntent) -> Result<u64> {
        let tx = Self::request(from, intent);
        self.read(chain, "estimate_gas", |url| {
            let tx = tx.clone();
            async move {
                ProviderBuilder::new()
                    .connect_http(url)
                    .estimate_gas(tx)
                    .await
                    .map_err(|e| rpc_error("estimate_gas", e))
            }
        })
        .await
    }

    async fn gas_price(&self, chain: Chain) -> Result<u128> {
        self.read(chain, "gas_price", |url| async move {
            ProviderBuilder::new()
                .connect_http(url)
                .get_gas_price()
                .await
                .map_err(|e| rpc_error("gas_price", e))
        })
        .await
    }
}

#[async_trait]
impl TransactionExecutor for EvmGateway {
    async fn send(&self, chain: Chain, from: Address, intent: &TxIntent) -> Result<String> {
        let signer = self
            .signers
            .get(&from)
            .cloned()
            .ok_or_else(|| ExecutionError::UnknownSigner(from.to_string()))?;
        let wallet = EthereumWallet::from(signer);
        let url = Self::endpoints(chain)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Rpc(format!("{chain}: no RPC endpoint configured")))?;
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        let tx = Self::request(from, intent).with_chain_id(chain.id());
        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| rpc_error("send_transaction", e))?;
        let tx_hash = pending.tx_hash().to_string();
        info!(chain = %chain, wallet = %from, tx_hash = %tx_hash, "Transaction sent");
        Ok(tx_hash)
    }

    async fn wait_for_status(&self, chain: Chain, tx_hash: &str, max_wait: Duration) -> Result<TxStatus> {
        let hash: B256 = tx_hash
            .parse()
            .map_err(|_| Error::Parse(format!("invalid transaction hash '{tx_hash}'")))?;
        let deadline = Instant::now() + max_wait;

        loop {
            let receipt = self
                .read(chain, "receipt", |url| async move {
                    ProviderBuilder::new()
                        .connect_http(url)
                        .get_transaction_receipt(hash)
                        .await
                        .map_err(|e| rpc_error("get_transaction_receipt", e))
                })
                .await;
            match receipt {
                Ok(Some(receipt)) if receipt.status() => return Ok(TxStatus::Success),
                Ok(Some(_)) => return Ok(TxStatus::Failed),
                Ok(None) => {}
                Err(err) => debug!(chain = %chain, tx_hash, error = %err, "Receipt lookup failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(chain = %chain, tx_hash, waited_secs = max_wait.as_secs(), "No receipt yet");
                return Ok(TxStatus::Unknown);
            }
            tokio::time::sleep(self.receipt_interval.min(deadline - now)).await;
        }
    }
}

/// Map a node error message onto the crate's error classes.
fn rpc_error(call: &str, err: impl fmt::Display) -> Error {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("nonce too low")
        || lower.contains("replacement transaction underpriced")
        || lower.contains("already known")
    {
        ExecutionError::NonceConflict(message).into()
    } else if lower.contains("insufficient funds") {
        ExecutionError::InsufficientBalance(message).into()
    } else if lower.contains("execution reverted") {
        ExecutionError::SimulationFailed(message).into()
    } else if lower.contains("429") || lower.contains("rate limit") {
        Error::RateLimited(message)
    } else {
        Error::Rpc(format!("{call}: {message}"))
    }
}
