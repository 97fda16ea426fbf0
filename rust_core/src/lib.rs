//! Gagstock Core - shared logic for the GAG stock watcher services.
//!
//! This crate provides:
//! - Payload normalization for the upstream stock API (double-encoded JSON,
//!   permissive field reads)
//! - Order-independent content fingerprinting and change detection
//! - HTML-safe message formatting grouped by category
//! - Subscriber/state persistence behind a store trait (Redis-backed)
//! - Broadcast fan-out with per-recipient failure isolation
//! - The poll cycle itself, reused by the long-running watcher bot and the
//!   request-triggered poll endpoint

pub mod broadcast;
pub mod clients;
pub mod cycle;
pub mod detect;
pub mod format;
pub mod models;
pub mod payload;
pub mod store;

pub use broadcast::{broadcast, BroadcastReport, MessageSender};
pub use cycle::{push_snapshot, run_cycle, CycleOutcome};
pub use detect::{canonical_json, evaluate, fingerprint};
pub use models::{ChangeReason, NotificationState, StockPayload};
pub use payload::{parse_stock_payload, PayloadError};
pub use store::{MemoryStore, RedisStore, StateStore};
