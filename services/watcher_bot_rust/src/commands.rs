//! Telegram command listener: long-polls getUpdates and dispatches the
//! handful of commands the bot understands. Anything that is not a command
//! is ignored without a reply.

use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use gagstock_rust_core::clients::{StockApiClient, TelegramClient, TgUpdate};
use gagstock_rust_core::{push_snapshot, MessageSender, StateStore};

const HELP_TEXT: &str = "Hi! I'll notify you when GAG Stock updates.\n\
Commands:\n\
/subscribe - receive updates\n\
/unsubscribe - stop updates\n\
/status - show latest known timestamp\n\
/now - fetch and push the current stock immediately";

const UPDATES_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll loop. A transport error on getUpdates backs off briefly and
/// retries; the offset only advances past updates we actually received.
pub async fn command_loop(
    updates_timeout_secs: u64,
    store: Arc<dyn StateStore>,
    stock: StockApiClient,
    telegram: TelegramClient,
) {
    info!("Command listener started");
    let mut offset: i64 = 0;

    loop {
        match telegram.get_updates(offset, updates_timeout_secs).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    handle_update(&update, store.as_ref(), &stock, &telegram).await;
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {:#}", e);
                tokio::time::sleep(UPDATES_RETRY_DELAY).await;
            }
        }
    }
}

async fn handle_update(
    update: &TgUpdate,
    store: &dyn StateStore,
    stock: &StockApiClient,
    telegram: &TelegramClient,
) {
    let Some(message) = &update.message else {
        return;
    };
    let Some(text) = message.text.as_deref() else {
        return;
    };
    let text = text.trim();
    if !text.starts_with('/') {
        return;
    }

    let chat_id = message.chat.id;
    let reply = dispatch_command(text, chat_id, store, stock, telegram).await;

    if let Some(reply) = reply {
        if let Err(e) = telegram.send_message(chat_id, &reply).await {
            warn!("Reply to {} failed: {:#}", chat_id, e);
        }
    }
}

/// Map a command to its reply text, mutating the store or triggering a
/// push as a side effect. `None` means no reply (unrecognized command).
pub async fn dispatch_command(
    text: &str,
    chat_id: i64,
    store: &dyn StateStore,
    stock: &StockApiClient,
    sender: &dyn MessageSender,
) -> Option<String> {
    if text.starts_with("/start") {
        return Some(HELP_TEXT.to_string());
    }

    if text.starts_with("/subscribe") {
        return Some(match store.add_subscriber(chat_id).await {
            Ok(true) => {
                info!("Subscribed chat {}", chat_id);
                "Subscribed! You'll get messages on updates. Use /now to get the latest instantly."
                    .to_string()
            }
            Ok(false) => "Already subscribed. Use /now to get the latest instantly.".to_string(),
            Err(e) => {
                warn!("Subscribe for {} failed: {:#}", chat_id, e);
                "Could not subscribe right now, please try again.".to_string()
            }
        });
    }

    if text.starts_with("/unsubscribe") {
        return Some(match store.remove_subscriber(chat_id).await {
            Ok(_) => {
                info!("Unsubscribed chat {}", chat_id);
                "Unsubscribed. You won't receive further updates.".to_string()
            }
            Err(e) => {
                warn!("Unsubscribe for {} failed: {:#}", chat_id, e);
                "Could not unsubscribe right now, please try again.".to_string()
            }
        });
    }

    if text.starts_with("/status") {
        return Some(match store.load_state().await {
            Ok(state) => format!(
                "Last known updated_at: {}",
                state.updated_at.as_deref().unwrap_or("unknown")
            ),
            Err(e) => {
                warn!("Status read failed: {:#}", e);
                "State is unavailable right now, please try again.".to_string()
            }
        });
    }

    if text.starts_with("/now") {
        return Some(match stock.fetch().await {
            Ok(payload) => match push_snapshot(&payload, store, sender).await {
                Ok(report) => {
                    info!(
                        "Manual push: {} sent, {} failed",
                        report.sent, report.failed
                    );
                    "Pushed the latest stock to all subscribers.".to_string()
                }
                Err(e) => {
                    warn!("Manual push failed: {:#}", e);
                    format!("Push failed: {e}")
                }
            },
            Err(e) => format!("Fetch failed: {e}"),
        });
    }

    // Unrecognized commands get no reply.
    None
}
