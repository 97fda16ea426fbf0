use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::NotificationState;
use crate::store::StateStore;

/// In-process store with the same semantics as [`crate::store::RedisStore`].
/// Used by tests and dry runs; nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    state: NotificationState,
    subs: HashSet<i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_state(&self) -> Result<NotificationState> {
        Ok(self.inner.lock().await.state.clone())
    }

    async fn save_state(&self, state: &NotificationState) -> Result<()> {
        self.inner.lock().await.state = state.clone();
        Ok(())
    }

    async fn subscribers(&self) -> Result<HashSet<i64>> {
        Ok(self.inner.lock().await.subs.clone())
    }

    async fn add_subscriber(&self, chat_id: i64) -> Result<bool> {
        Ok(self.inner.lock().await.subs.insert(chat_id))
    }

    async fn remove_subscriber(&self, chat_id: i64) -> Result<bool> {
        Ok(self.inner.lock().await.subs.remove(&chat_id))
    }
}
