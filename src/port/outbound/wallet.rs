//! Wallet source port.

use crate::domain::wallet::WalletEntry;
use crate::error::Result;

/// Supplies the wallets of a run, already validated.
pub trait WalletSource: Send + Sync {
    /// Load wallets in file order.
    ///
    /// When `require_destination` is set every entry must carry a valid
    /// destination address.
    fn load(&self, require_destination: bool) -> Result<Vec<WalletEntry>>;
}
