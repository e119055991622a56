pub mod contracts;
pub mod gateway;
