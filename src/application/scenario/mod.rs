//! Named scenarios offered by the command line.

pub mod balances;
pub mod bridge;
pub mod collect;
pub mod sell;
pub mod send;
pub mod sequence;
