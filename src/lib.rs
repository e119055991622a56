//! Dustsweep - multi-chain dust collection and value routing for EVM wallets.
//!
//! Walks a list of wallets and, per chain, turns leftover balances into
//! something useful: swaps dust tokens into native coin, forwards native coin
//! or a token to a destination address, bridges native coin onto one chain,
//! or sells a token above a price floor.
//!
//! # Architecture
//!
//! - [`domain`] - value expressions, chain selection, fee math, quotes,
//!   outcomes and the static chain registry. No I/O.
//! - [`port`] - traits the core calls into (prices, balances, routes,
//!   execution, notifications) and the operator surface the CLI calls.
//! - [`application`] - retry, route fallback, the execution orchestrator,
//!   pacing, the wallet driver and the named scenarios.
//! - [`adapter`] - EVM RPC, aggregator and bridge HTTP clients, price and
//!   token list sources, wallet file, notifiers, and the CLI.
//! - [`infrastructure`] - configuration, logging and wiring.
//!
//! # Features
//!
//! - `telegram` (default) - Telegram notifier
//! - `testkit` - scripted in-memory collaborators for tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
