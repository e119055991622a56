//! Shared helper routines for operator implementations.

use rust_decimal::Decimal;

use crate::adapter::outbound::wallet::file::WalletFile;
use crate::domain::wallet::WalletEntry;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::wallet::WalletSource;

const GWEI_SCALE: u32 = 9;

/// Load the configured wallets, refusing an empty file.
pub(super) fn load_wallets(config: &Config, require_destination: bool) -> Result<Vec<WalletEntry>> {
    let wallets = WalletFile::new(&config.general.wallets_file).load(require_destination)?;
    if wallets.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "general.wallets_file",
            reason: format!("{} holds no wallets", config.general.wallets_file.display()),
        }
        .into());
    }
    Ok(wallets)
}

/// Wei to gwei with three decimals.
pub(super) fn wei_to_gwei(wei: u128) -> Option<Decimal> {
    let wei = i128::try_from(wei).ok()?;
    Decimal::try_from_i128_with_scale(wei, GWEI_SCALE)
        .ok()
        .map(|gwei| gwei.round_dp(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn gwei_conversion_rounds() {
        assert_eq!(wei_to_gwei(12_345_678_901), Some(dec!(12.346)));
        assert_eq!(wei_to_gwei(0), Some(Decimal::ZERO));
    }

    #[test]
    fn empty_wallet_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.general.wallets_file = file.path().to_path_buf();
        let err = load_wallets(&config, false).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("no wallets"));
    }
}
