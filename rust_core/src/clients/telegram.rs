use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::broadcast::MessageSender;

const SEND_TIMEOUT: Duration = Duration::from_secs(20);
/// Margin on top of the long-poll timeout so the HTTP layer outlives it.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Minimal Telegram Bot API client: HTML message sends plus getUpdates
/// long polling for the command listener.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

impl TelegramClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    /// Long-poll for updates after `offset`. Returns an empty vec when the
    /// poll window elapses with nothing new.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<TgUpdate>> {
        let url = self.method_url("getUpdates");
        let resp = self
            .http
            .get(&url)
            .query(&[("offset", offset), ("timeout", timeout_secs as i64)])
            .timeout(Duration::from_secs(timeout_secs) + POLL_TIMEOUT_MARGIN)
            .send()
            .await
            .context("getUpdates request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("getUpdates non-2xx: {status}");
        }

        let body: ApiResponse<Vec<TgUpdate>> = resp.json().await?;
        if !body.ok {
            anyhow::bail!(
                "getUpdates rejected: {}",
                body.description.unwrap_or_default()
            );
        }
        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = self.method_url("sendMessage");
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .context("sendMessage request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("sendMessage non-2xx: {status} body={text}");
        }

        let body: ApiResponse<serde_json::Value> = resp.json().await?;
        if !body.ok {
            anyhow::bail!(
                "sendMessage rejected: {}",
                body.description.unwrap_or_default()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_update_deserialization() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":7,"message":{"chat":{"id":42},"text":"/subscribe"}},
            {"update_id":8,"message":{"chat":{"id":43}}},
            {"update_id":9}
        ]}"#;
        let body: ApiResponse<Vec<TgUpdate>> = serde_json::from_str(raw).unwrap();
        assert!(body.ok);
        let updates = body.result.unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].update_id, 7);
        assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 42);
        assert_eq!(
            updates[0].message.as_ref().unwrap().text.as_deref(),
            Some("/subscribe")
        );
        assert!(updates[2].message.is_none());
    }
}
