//! Path utilities for dustsweep.
//!
//! Defaults live under `~/.dustsweep/`:
//! - `~/.dustsweep/config.toml` - main configuration
//!
//! The wallets file is resolved by the configuration itself, relative to the
//! working directory.

use std::path::PathBuf;

/// Returns the dustsweep home directory (`~/.dustsweep/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dustsweep")
}

/// Returns the default config file path (`~/.dustsweep/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}
