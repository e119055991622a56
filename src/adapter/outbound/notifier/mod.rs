//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for chat backends. The log notifier
//! lives next to the port since every run registers it.

#[cfg(feature = "telegram")]
pub mod telegram;
