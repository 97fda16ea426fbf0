use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

use gagstock_rust_core::clients::{StockApiClient, TelegramClient};
use gagstock_rust_core::{RedisStore, StateStore};
use watcher_bot_rust::commands::command_loop;
use watcher_bot_rust::watcher::watcher_loop;
use watcher_bot_rust::WatcherConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting watcher_bot_rust...");

    let cfg = WatcherConfig::from_env()?;
    info!(
        "Config: stock_api={} poll_interval={}s",
        cfg.stock_api_url, cfg.poll_interval_secs
    );

    let store: Arc<dyn StateStore> = Arc::new(RedisStore::new(&cfg.redis_url).await?);
    info!("Connected to Redis");

    let stock = StockApiClient::new(cfg.stock_api_url.clone());
    let telegram = TelegramClient::new(cfg.telegram_api_base_url.clone(), cfg.telegram_bot_token.clone());

    // Poll loop runs in the background; the command listener owns the
    // foreground. They share nothing but the store.
    {
        let store = store.clone();
        let stock = stock.clone();
        let telegram = telegram.clone();
        let interval = cfg.poll_interval_secs;
        tokio::spawn(async move {
            watcher_loop(interval, store, stock, telegram).await;
        });
    }

    command_loop(cfg.updates_timeout_secs, store, stock, telegram).await;
    Ok(())
}
