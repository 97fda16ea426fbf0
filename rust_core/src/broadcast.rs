//! Broadcast fan-out with per-recipient failure isolation.

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use log::warn;

/// Anything that can deliver one message to one chat. Implemented by the
/// Telegram client; tests substitute recorders and failure injectors.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send `text` to every chat id. Sends run concurrently; a failure for one
/// recipient is logged and counted but never aborts the rest and never
/// surfaces as an error. No retries within one broadcast.
pub async fn broadcast(
    sender: &dyn MessageSender,
    chat_ids: &[i64],
    text: &str,
) -> BroadcastReport {
    if chat_ids.is_empty() {
        return BroadcastReport::default();
    }

    let sends = chat_ids.iter().map(|&chat_id| async move {
        (chat_id, sender.send_message(chat_id, text).await)
    });

    let mut report = BroadcastReport::default();
    for (chat_id, result) in join_all(sends).await {
        match result {
            Ok(()) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                warn!("Send to {} failed: {:#}", chat_id, e);
            }
        }
    }
    report
}
