//! Infrastructure configuration modules.

pub mod general;
pub mod logging;
pub mod scenario;
pub mod settings;
pub mod telegram;
