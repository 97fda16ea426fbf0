//! Persistence for the subscriber set and the notification state.
//!
//! Both records are small and written whole on every mutation; the store is
//! the only thing the poll loop and the command handler share, so there is
//! no in-process source of truth to drift.

pub mod memory;
pub mod redis;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use crate::models::NotificationState;

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// Stable key for the persisted notification state.
pub const STATE_KEY: &str = "gagstock:state";
/// Stable key for the subscriber list.
pub const SUBS_KEY: &str = "gagstock:subs";

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Last persisted notification state; nulls when nothing was stored yet.
    async fn load_state(&self) -> Result<NotificationState>;

    /// Overwrite the notification state.
    async fn save_state(&self, state: &NotificationState) -> Result<()>;

    /// Current subscriber snapshot.
    async fn subscribers(&self) -> Result<HashSet<i64>>;

    /// Add a chat id. Returns false when it was already subscribed.
    async fn add_subscriber(&self, chat_id: i64) -> Result<bool>;

    /// Remove a chat id. No-op (false) when it was not subscribed.
    async fn remove_subscriber(&self, chat_id: i64) -> Result<bool>;
}
