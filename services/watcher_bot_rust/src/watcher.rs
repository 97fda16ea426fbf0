//! The scheduled poll loop: fetch, normalize, detect, broadcast, persist.

use anyhow::Result;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use gagstock_rust_core::clients::{StockApiClient, TelegramClient};
use gagstock_rust_core::{run_cycle, StateStore};

/// Loop forever on a fixed tick. Every error inside one iteration is
/// logged and swallowed; a failed cycle must never kill the watcher.
pub async fn watcher_loop(
    poll_interval_secs: u64,
    store: Arc<dyn StateStore>,
    stock: StockApiClient,
    telegram: TelegramClient,
) {
    info!("Watcher loop started (interval: {}s)", poll_interval_secs);
    let mut ticker = interval(Duration::from_secs(poll_interval_secs));

    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(store.as_ref(), &stock, &telegram).await {
            error!("Poll cycle failed: {:#}", e);
        }
    }
}

/// One scheduled tick. Fetch or shape errors abort the cycle before any
/// state is written; the next tick retries from the persisted state.
async fn poll_once(
    store: &dyn StateStore,
    stock: &StockApiClient,
    telegram: &TelegramClient,
) -> Result<()> {
    let payload = stock.fetch().await?;
    let outcome = run_cycle(&payload, store, telegram).await?;

    if !outcome.changed {
        info!(
            "No change (updated_at: {})",
            outcome.updated_at.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}
