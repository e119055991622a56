//! Inbound (driving) ports consumed by inbound adapters.
//!
//! # Modules
//!
//! - [`operator`]: Operator-facing use cases for running scenarios,
//!   inspecting configuration and diagnostics

pub mod operator;
