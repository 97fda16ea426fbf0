//! Configuration for watcher_bot_rust

use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_STOCK_API_URL: &str = "https://gagstock.gleeze.com/grow-a-garden";
pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    // Transport credentials/endpoints
    pub telegram_bot_token: String,
    pub telegram_api_base_url: String,
    pub stock_api_url: String,

    // Persistence
    pub redis_url: String,

    // Scheduling
    pub poll_interval_secs: u64,
    pub updates_timeout_secs: u64,
}

impl WatcherConfig {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        let poll_interval_secs = parse_u64("POLL_INTERVAL_SECS", 60)?;
        if poll_interval_secs == 0 {
            return Err(anyhow!("POLL_INTERVAL_SECS must be > 0"));
        }

        Ok(Self {
            telegram_bot_token,

            telegram_api_base_url: env::var("TELEGRAM_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE_URL.to_string()),

            stock_api_url: env::var("STOCK_API_URL")
                .unwrap_or_else(|_| DEFAULT_STOCK_API_URL.to_string()),

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            poll_interval_secs,
            updates_timeout_secs: parse_u64("TELEGRAM_UPDATES_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val
            .parse()
            .map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        Err(_) => Ok(default),
    }
}
