//! Chain-agnostic value-routing types and pure policy logic.
//!
//! Nothing in here performs I/O or depends on an async runtime.

pub mod chain;
pub mod fee;
pub mod intent;
pub mod outcome;
pub mod policy;
pub mod quote;
pub mod registry;
pub mod selection;
pub mod token;
pub mod value;
pub mod wallet;
