//! Use-case orchestration built on domain types and outbound ports.

pub mod driver;
pub mod gas_gate;
pub mod orchestrator;
pub mod pacing;
pub mod polling;
pub mod retry;
pub mod routing;
pub mod scenario;
