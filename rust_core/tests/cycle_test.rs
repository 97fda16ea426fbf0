//! End-to-end cycle tests against the in-memory store.
//!
//! These exercise the same `run_cycle` path both deployment shapes use,
//! with a recording sender standing in for the Telegram transport.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use gagstock_rust_core::models::ChangeReason;
use gagstock_rust_core::{
    parse_stock_payload, push_snapshot, run_cycle, MemoryStore, MessageSender, NotificationState,
    PayloadError, StateStore,
};

#[derive(Default)]
struct RecordingSender {
    messages: Mutex<Vec<(i64, String)>>,
    fail_for: Option<i64>,
}

impl RecordingSender {
    fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail_for == Some(chat_id) {
            return Err(anyhow!("chat {chat_id} unreachable"));
        }
        self.messages
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }
}

const EGG_BODY: &str = r#"{"updated_at":"2024-01-01T00:00Z","data":{"egg":{"items":[{"name":"Common Egg","quantity":"3","emoji":"🥚"}]}}}"#;

#[tokio::test]
async fn test_first_cycle_broadcasts_to_subscribers() {
    let store = MemoryStore::new();
    store.add_subscriber(42).await.unwrap();
    let sender = RecordingSender::default();

    let payload = parse_stock_payload(EGG_BODY).unwrap();
    let outcome = run_cycle(&payload, &store, &sender).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.reason, Some(ChangeReason::Initial));
    assert_eq!(outcome.updated_at.as_deref(), Some("2024-01-01T00:00Z"));

    let messages = sender.messages();
    assert_eq!(messages.len(), 1);
    let (chat_id, text) = &messages[0];
    assert_eq!(*chat_id, 42);
    assert!(text.contains("<b>GAG Stock Update</b>"));
    assert!(text.contains("updated_at: <code>2024-01-01T00:00Z</code>"));
    assert!(text.contains("<b>Egg</b>"));
    assert!(text.contains("• 🥚 Common Egg ×3"));
}

#[tokio::test]
async fn test_second_identical_poll_is_quiet() {
    let store = MemoryStore::new();
    store.add_subscriber(42).await.unwrap();
    let sender = RecordingSender::default();

    let payload = parse_stock_payload(EGG_BODY).unwrap();
    run_cycle(&payload, &store, &sender).await.unwrap();

    let outcome = run_cycle(&payload, &store, &sender).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.reason, None);
    assert_eq!(sender.messages().len(), 1);
}

#[tokio::test]
async fn test_state_persisted_even_without_broadcast() {
    let store = MemoryStore::new();
    let sender = RecordingSender::default();

    // No subscribers: no messages, but the state row still moves.
    let payload = parse_stock_payload(EGG_BODY).unwrap();
    run_cycle(&payload, &store, &sender).await.unwrap();
    run_cycle(&payload, &store, &sender).await.unwrap();

    let state = store.load_state().await.unwrap();
    assert_eq!(state.updated_at.as_deref(), Some("2024-01-01T00:00Z"));
    assert!(state.hash.is_some());
    assert!(sender.messages().is_empty());
}

#[tokio::test]
async fn test_timestamp_move_retriggers() {
    let store = MemoryStore::new();
    store.add_subscriber(1).await.unwrap();
    let sender = RecordingSender::default();

    let first = parse_stock_payload(EGG_BODY).unwrap();
    run_cycle(&first, &store, &sender).await.unwrap();

    let second = parse_stock_payload(
        r#"{"updated_at":"2024-01-01T00:05Z","data":{"egg":{"items":[{"name":"Common Egg","quantity":"3","emoji":"🥚"}]}}}"#,
    )
    .unwrap();
    let outcome = run_cycle(&second, &store, &sender).await.unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.reason, Some(ChangeReason::Timestamp));
    assert_eq!(sender.messages().len(), 2);
}

#[tokio::test]
async fn test_partial_send_failure_still_persists_and_delivers_rest() {
    let store = MemoryStore::new();
    store.add_subscriber(1).await.unwrap();
    store.add_subscriber(2).await.unwrap();
    store.add_subscriber(3).await.unwrap();
    let sender = RecordingSender {
        fail_for: Some(2),
        ..Default::default()
    };

    let payload = parse_stock_payload(EGG_BODY).unwrap();
    let outcome = run_cycle(&payload, &store, &sender).await.unwrap();

    assert!(outcome.changed);
    let mut reached: Vec<i64> = sender.messages().iter().map(|(id, _)| *id).collect();
    reached.sort_unstable();
    assert_eq!(reached, vec![1, 3]);
    assert!(store.load_state().await.unwrap().hash.is_some());
}

#[tokio::test]
async fn test_non_json_body_leaves_state_untouched() {
    let store = MemoryStore::new();

    let err = parse_stock_payload("not json").unwrap_err();
    assert!(matches!(err, PayloadError::NonJson(_)));

    // The driver never reaches run_cycle on a shape error, so the state
    // record stays exactly as it was.
    assert_eq!(
        store.load_state().await.unwrap(),
        NotificationState::default()
    );
}

#[tokio::test]
async fn test_push_snapshot_broadcasts_without_state_write() {
    let store = MemoryStore::new();
    store.add_subscriber(9).await.unwrap();
    let sender = RecordingSender::default();

    let payload = parse_stock_payload(EGG_BODY).unwrap();
    let report = push_snapshot(&payload, &store, &sender).await.unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(sender.messages().len(), 1);
    assert_eq!(
        store.load_state().await.unwrap(),
        NotificationState::default()
    );

    // The next scheduled cycle still sees the change.
    let outcome = run_cycle(&payload, &store, &sender).await.unwrap();
    assert!(outcome.changed);
}
