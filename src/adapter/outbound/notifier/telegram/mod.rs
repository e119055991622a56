//! Telegram notifications for run events.

mod format;

pub mod notifier;
