//! Outbound adapters (driven side).

pub mod discovery;
pub mod evm;
pub mod http;
pub mod notifier;
pub mod price;
pub mod route;
pub mod wallet;
