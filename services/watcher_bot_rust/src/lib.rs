//! watcher_bot_rust - long-running deployment shape: a scheduled poll loop
//! plus a Telegram command listener, sharing state through the store only.

pub mod commands;
pub mod config;
pub mod watcher;

pub use config::WatcherConfig;
