//! In-memory implementations of the chain access ports.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::chain::Chain;
use crate::domain::intent::TxIntent;
use crate::domain::token::Asset;
use crate::error::{Error, Result};
use crate::port::outbound::chain::{BalanceReader, GasEstimator, TransactionExecutor, TxStatus};

// ---------------------------------------------------------------------------
// MemoryBalances
// ---------------------------------------------------------------------------

/// Fixed balance table. Unknown entries read as zero.
#[derive(Default)]
pub struct MemoryBalances {
    balances: HashMap<(Chain, Address, Asset), U256>,
    allowance: U256,
    failures: AtomicU32,
    calls: Arc<AtomicU32>,
}

impl MemoryBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, chain: Chain, wallet: Address, asset: Asset, balance: U256) -> Self {
        self.balances.insert((chain, wallet, asset), balance);
        self
    }

    /// Allowance reported for every (token, owner, spender).
    pub fn with_allowance(mut self, allowance: U256) -> Self {
        self.allowance = allowance;
        self
    }

    /// Fail the first `n` reads with a transient RPC error.
    pub fn failing_first(self, n: u32) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceReader for MemoryBalances {
    async fn balance(&self, chain: Chain, wallet: Address, asset: Asset) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures.store(pending - 1, Ordering::SeqCst);
            return Err(Error::Rpc("connection reset".into()));
        }
        Ok(self
            .balances
            .get(&(chain, wallet, asset))
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(&self, _chain: Chain, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(self.allowance)
    }
}

// ---------------------------------------------------------------------------
// FixedGas
// ---------------------------------------------------------------------------

/// Constant gas limit and price, with an optional scripted price sequence.
pub struct FixedGas {
    gas_limit: u64,
    gas_price: u128,
    prices: Mutex<VecDeque<u128>>,
}

impl FixedGas {
    pub fn new(gas_limit: u64, gas_price: u128) -> Self {
        Self {
            gas_limit,
            gas_price,
            prices: Mutex::new(VecDeque::new()),
        }
    }

    /// Prices returned by successive `gas_price` calls before falling back
    /// to the fixed one.
    pub fn with_prices(self, prices: Vec<u128>) -> Self {
        *self.prices.lock() = prices.into();
        self
    }
}

#[async_trait]
impl GasEstimator for FixedGas {
    async fn estimate_gas(&self, _chain: Chain, _from: Address, _intent: &TxIntent) -> Result<u64> {
        Ok(self.gas_limit)
    }

    async fn gas_price(&self, _chain: Chain) -> Result<u128> {
        Ok(self.prices.lock().pop_front().unwrap_or(self.gas_price))
    }
}

// ---------------------------------------------------------------------------
// RecordingExecutor
// ---------------------------------------------------------------------------

/// One submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    pub chain: Chain,
    pub from: Address,
    pub intent: TxIntent,
    pub tx_hash: String,
}

/// Shared view of everything a [`RecordingExecutor`] sent.
#[derive(Clone, Default)]
pub struct SentLog {
    sent: Arc<Mutex<Vec<SentTx>>>,
}

impl SentLog {
    pub fn all(&self) -> Vec<SentTx> {
        self.sent.lock().clone()
    }

    pub fn intents(&self) -> Vec<TxIntent> {
        self.sent.lock().iter().map(|tx| tx.intent.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

/// Accepts every transaction and reports a configurable status.
pub struct RecordingExecutor {
    log: SentLog,
    status: TxStatus,
    send_errors: Mutex<VecDeque<Error>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            log: SentLog::default(),
            status: TxStatus::Success,
            send_errors: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_status(mut self, status: TxStatus) -> Self {
        self.status = status;
        self
    }

    /// Errors returned by successive `send` calls before sends succeed.
    pub fn with_send_errors(self, errors: Vec<Error>) -> Self {
        *self.send_errors.lock() = errors.into();
        self
    }

    pub fn handle(&self) -> SentLog {
        self.log.clone()
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionExecutor for RecordingExecutor {
    async fn send(&self, chain: Chain, from: Address, intent: &TxIntent) -> Result<String> {
        if let Some(err) = self.send_errors.lock().pop_front() {
            return Err(err);
        }
        let mut sent = self.log.sent.lock();
        let tx_hash = format!("0x{:064x}", sent.len() + 1);
        sent.push(SentTx {
            chain,
            from,
            intent: intent.clone(),
            tx_hash: tx_hash.clone(),
        });
        Ok(tx_hash)
    }

    async fn wait_for_status(&self, _chain: Chain, _tx_hash: &str, _max_wait: Duration) -> Result<TxStatus> {
        Ok(self.status)
    }
}
