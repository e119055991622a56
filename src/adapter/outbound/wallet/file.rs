//! Plain-text wallet file.
//!
//! One wallet per line: `private_key` or `private_key,destination`. Blank
//! lines and lines starting with `#` are ignored.

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use tracing::info;

use crate::domain::wallet::WalletEntry;
use crate::error::{ConfigError, Result};
use crate::port::outbound::wallet::WalletSource;

/// Wallets read from a file on every [`WalletSource::load`].
pub struct WalletFile {
    path: PathBuf,
}

impl WalletFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_line(line: usize, raw: &str, require_destination: bool) -> std::result::Result<WalletEntry, ConfigError> {
    let invalid = |reason: String| ConfigError::WalletEntry { line, reason };
    let mut parts = raw.split(',').map(str::trim);
    let key_text = parts.next().unwrap_or_default();
    let key_hex = key_text.strip_prefix("0x").unwrap_or(key_text);
    let private_key: B256 = key_hex
        .parse()
        .map_err(|_| invalid("private key must be 32 bytes of hex".into()))?;
    let signer = PrivateKeySigner::from_bytes(&private_key).map_err(|e| invalid(e.to_string()))?;

    let destination = match parts.next().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<Address>()
                .map_err(|_| invalid(format!("invalid destination address '{raw}'")))?,
        ),
        None => None,
    };
    if parts.next().is_some() {
        return Err(invalid("expected at most two comma-separated fields".into()));
    }
    if require_destination && destination.is_none() {
        return Err(invalid("missing destination address".into()));
    }

    Ok(WalletEntry {
        address: signer.address(),
        private_key,
        destination,
    })
}

/// Parse wallet file contents. Line numbers in errors are 1-based.
///
/// # Errors
///
/// Returns [`ConfigError::WalletEntry`] for the first malformed line.
pub fn parse_wallets(contents: &str, require_destination: bool) -> std::result::Result<Vec<WalletEntry>, ConfigError> {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, raw)| parse_line(line, raw, require_destination))
        .collect()
}

impl WalletSource for WalletFile {
    fn load(&self, require_destination: bool) -> Result<Vec<WalletEntry>> {
        let contents = std::fs::read_to_string(&self.path).map_err(ConfigError::ReadFile)?;
        let wallets = parse_wallets(&contents, require_destination)?;
        info!(path = %self.path.display(), wallets = wallets.len(), "Loaded wallets");
        Ok(wallets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY: &str = "0x4242424242424242424242424242424242424242424242424242424242424242";
    const DEST: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn parses_keys_with_optional_destination() {
        let contents = format!("# main\n{KEY}\n\n{},{DEST}\n", KEY.trim_start_matches("0x"));
        let wallets = parse_wallets(&contents, false).unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].address, wallets[1].address);
        assert_eq!(wallets[0].destination, None);
        assert_eq!(wallets[1].destination, Some(DEST.parse().unwrap()));
    }

    #[test]
    fn reports_line_of_bad_entry() {
        let contents = format!("{KEY}\n# comment\nnot-a-key\n");
        let err = parse_wallets(&contents, false).unwrap_err();
        assert!(matches!(err, ConfigError::WalletEntry { line: 3, .. }));
    }

    #[test]
    fn destination_can_be_required() {
        let err = parse_wallets(KEY, true).unwrap_err();
        assert!(matches!(err, ConfigError::WalletEntry { line: 1, .. }));
        assert!(parse_wallets(&format!("{KEY},{DEST}"), true).is_ok());
    }

    #[test]
    fn bad_destination_is_rejected() {
        let err = parse_wallets(&format!("{KEY},0x1234"), false).unwrap_err();
        assert!(err.to_string().contains("invalid destination"));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{KEY},{DEST}").unwrap();
        let wallets = WalletFile::new(file.path()).load(true).unwrap();
        assert_eq!(wallets.len(), 1);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = WalletFile::new("/definitely/not/here.txt").load(false).unwrap_err();
        assert!(err.is_config());
    }
}
