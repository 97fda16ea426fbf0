//! The poll cycle shared by both deployment shapes.
//!
//! The long-running watcher and the request-triggered endpoint both call
//! [`run_cycle`] after fetching, so their behavior cannot drift. Manual
//! pushes (`/now`) go through [`push_snapshot`], which broadcasts without
//! consulting or mutating the persisted state.

use anyhow::{Context, Result};
use log::info;

use crate::broadcast::{broadcast, BroadcastReport, MessageSender};
use crate::detect::{evaluate, fingerprint};
use crate::format::format_message;
use crate::models::{ChangeReason, NotificationState, StockPayload};
use crate::store::StateStore;

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub changed: bool,
    pub reason: Option<ChangeReason>,
    pub updated_at: Option<String>,
}

/// One full cycle: fingerprint, compare against the persisted state,
/// broadcast on change, then persist the new state whether or not a
/// broadcast happened. Repeated identical polls stop re-triggering because
/// the state row always moves forward.
pub async fn run_cycle(
    payload: &StockPayload,
    store: &dyn StateStore,
    sender: &dyn MessageSender,
) -> Result<CycleOutcome> {
    let hash = fingerprint(&payload.data);
    let prev = store
        .load_state()
        .await
        .context("Failed to load notification state")?;

    let reason = evaluate(&prev, payload.updated_at.as_deref(), &hash);

    if let Some(reason) = reason {
        let message = format_message(payload);
        let subscribers: Vec<i64> = store.subscribers().await?.into_iter().collect();
        let report = broadcast(sender, &subscribers, &message).await;
        info!(
            "Broadcasted update to {} subscriber(s), {} failed ({})",
            report.sent,
            report.failed,
            reason.as_str()
        );
    }

    let state = NotificationState {
        updated_at: payload.updated_at.clone(),
        hash: Some(hash),
    };
    store
        .save_state(&state)
        .await
        .context("Failed to persist notification state")?;

    Ok(CycleOutcome {
        changed: reason.is_some(),
        reason,
        updated_at: payload.updated_at.clone(),
    })
}

/// Manual push: format and broadcast the payload as-is. The persisted state
/// is untouched, so the next scheduled cycle still compares against the
/// last automatic observation.
pub async fn push_snapshot(
    payload: &StockPayload,
    store: &dyn StateStore,
    sender: &dyn MessageSender,
) -> Result<BroadcastReport> {
    let message = format_message(payload);
    let subscribers: Vec<i64> = store.subscribers().await?.into_iter().collect();
    Ok(broadcast(sender, &subscribers, &message).await)
}
