//! Operator implementations for inbound adapters.

pub mod configuration;
pub mod diagnostic;
pub mod entry;
pub mod runtime;

mod shared;
