//! Configuration for poll_api_rust

use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct PollApiConfig {
    pub telegram_bot_token: String,
    pub telegram_api_base_url: String,
    pub stock_api_url: String,
    pub redis_url: String,
    pub bind_addr: String,
}

impl PollApiConfig {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        Ok(Self {
            telegram_bot_token,

            telegram_api_base_url: env::var("TELEGRAM_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),

            stock_api_url: env::var("STOCK_API_URL")
                .unwrap_or_else(|_| "https://gagstock.gleeze.com/grow-a-garden".to_string()),

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            bind_addr: env::var("POLL_API_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}
