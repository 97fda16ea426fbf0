//! poll_api_rust - stateless deployment shape: an external scheduler hits
//! `GET /`, one poll cycle runs, and the response reports whether anything
//! changed. State lives in Redis so consecutive invocations converge with
//! the long-running watcher's behavior.

mod config;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use dotenv::dotenv;
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use config::PollApiConfig;
use gagstock_rust_core::clients::{StockApiClient, TelegramClient};
use gagstock_rust_core::{run_cycle, CycleOutcome, RedisStore, StateStore};

struct AppState {
    store: Arc<dyn StateStore>,
    stock: StockApiClient,
    telegram: TelegramClient,
}

#[derive(Serialize)]
struct PollResponse {
    ok: bool,
    changed: bool,
    updated_at: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting poll_api_rust...");

    let cfg = PollApiConfig::from_env()?;

    let store: Arc<dyn StateStore> = Arc::new(RedisStore::new(&cfg.redis_url).await?);
    info!("Connected to Redis");

    let state = Arc::new(AppState {
        store,
        stock: StockApiClient::new(cfg.stock_api_url.clone()),
        telegram: TelegramClient::new(cfg.telegram_api_base_url.clone(), cfg.telegram_bot_token.clone()),
    });

    let app = Router::new()
        .route("/", get(run_poll))
        .route("/health", get(health_check))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!("Poll endpoint listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run one scheduled poll cycle. Unlike the bot's manual `/now` push, this
/// *is* the scheduled tick for this deployment, so the state is persisted.
async fn run_poll(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<PollResponse>) {
    match poll_cycle(&state).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(PollResponse {
                ok: true,
                changed: outcome.changed,
                updated_at: outcome
                    .updated_at
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
        ),
        Err(e) => {
            error!("Poll cycle failed: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(PollResponse {
                    ok: false,
                    changed: false,
                    updated_at: "unknown".to_string(),
                }),
            )
        }
    }
}

async fn poll_cycle(state: &AppState) -> Result<CycleOutcome> {
    let payload = state.stock.fetch().await?;
    run_cycle(&payload, state.store.as_ref(), &state.telegram).await
}

async fn health_check() -> &'static str {
    "ok"
}
