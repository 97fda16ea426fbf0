use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::Connection, AsyncCommands, Client};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::NotificationState;
use crate::store::{StateStore, STATE_KEY, SUBS_KEY};

/// Redis-backed store. Holds one async connection behind a mutex; every
/// operation is a full read or a full rewrite of one key, which is plenty at
/// this write frequency.
#[derive(Clone)]
pub struct RedisStore {
    connection: Arc<Mutex<Connection>>,
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis URL")?;
        let connection = client
            .get_async_connection()
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    async fn read_key(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.lock().await;
        conn.get(key)
            .await
            .with_context(|| format!("Failed to read {key}"))
    }

    async fn write_key(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection.lock().await;
        conn.set::<_, _, ()>(key, value)
            .await
            .with_context(|| format!("Failed to write {key}"))
    }

    async fn write_subscribers(&self, subs: &HashSet<i64>) -> Result<()> {
        // Sorted on disk so the record is stable across rewrites.
        let mut list: Vec<i64> = subs.iter().copied().collect();
        list.sort_unstable();
        self.write_key(SUBS_KEY, &serde_json::to_string(&list)?).await
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn load_state(&self) -> Result<NotificationState> {
        match self.read_key(STATE_KEY).await? {
            Some(raw) => {
                serde_json::from_str(&raw).context("Corrupt notification state record")
            }
            None => Ok(NotificationState::default()),
        }
    }

    async fn save_state(&self, state: &NotificationState) -> Result<()> {
        self.write_key(STATE_KEY, &serde_json::to_string(state)?).await
    }

    async fn subscribers(&self) -> Result<HashSet<i64>> {
        match self.read_key(SUBS_KEY).await? {
            Some(raw) => {
                let list: Vec<i64> =
                    serde_json::from_str(&raw).context("Corrupt subscriber record")?;
                Ok(list.into_iter().collect())
            }
            None => Ok(HashSet::new()),
        }
    }

    async fn add_subscriber(&self, chat_id: i64) -> Result<bool> {
        let mut subs = self.subscribers().await?;
        let added = subs.insert(chat_id);
        if added {
            self.write_subscribers(&subs).await?;
        }
        Ok(added)
    }

    async fn remove_subscriber(&self, chat_id: i64) -> Result<bool> {
        let mut subs = self.subscribers().await?;
        let removed = subs.remove(&chat_id);
        if removed {
            self.write_subscribers(&subs).await?;
        }
        Ok(removed)
    }
}
