//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the external collaborators the engine calls into:
//! chains, prices, routes, token discovery, wallets and notifications.

pub mod chain;
pub mod discovery;
pub mod notifier;
pub mod price;
pub mod route;
pub mod wallet;
