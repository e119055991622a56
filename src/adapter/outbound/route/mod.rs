pub mod approval;
pub mod odos;
pub mod relay;
pub mod stargate;
pub mod sushiswap;
pub mod transfer;
