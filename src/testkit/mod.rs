//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`chain`] - In-memory chain collaborators: `MemoryBalances`, `FixedGas`,
//!   `RecordingExecutor`.
//! - [`route`] - `ScriptedRouteProvider` with per-call quote scripts.
//! - [`price`] - `StaticPriceOracle`.
//! - [`discovery`] - `StaticDiscovery` and `StaticWallets`.
//! - [`notifier`] - `RecordingNotifier` capturing every event.
//! - [`domain`] - Builders for wallets, tokens and amounts.

pub mod chain;
pub mod discovery;
pub mod domain;
pub mod notifier;
pub mod price;
pub mod route;
