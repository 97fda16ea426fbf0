use anyhow::{anyhow, Result};
use reqwest::Client;
use std::time::Duration;

use crate::models::StockPayload;
use crate::payload::parse_stock_payload;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "gagstock-watcher/1.0";

/// Client for the upstream stock feed.
#[derive(Debug, Clone)]
pub struct StockApiClient {
    client: Client,
    url: String,
}

impl StockApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Fetch and normalize the current stock payload. Transport failures
    /// and non-2xx responses error before the body is touched; body shape
    /// problems surface as [`crate::payload::PayloadError`].
    pub async fn fetch(&self) -> Result<StockPayload> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Stock API non-2xx: {status}"));
        }

        let body = resp.text().await?;
        Ok(parse_stock_payload(&body)?)
    }
}
