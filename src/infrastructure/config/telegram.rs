//! Telegram notification configuration.

use serde::Deserialize;

/// `[telegram]` section. Credentials come from the environment only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Also report skipped actions (can be noisy).
    #[serde(default)]
    pub notify_skips: bool,
}
