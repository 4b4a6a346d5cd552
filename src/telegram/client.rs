//! Minimal Telegram Bot API client over reqwest

use super::types::{ApiEnvelope, BotUser, GetUpdatesRequest, SendMessageRequest, Update};
use super::ChatTransport;
use crate::config::TelegramCfg;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Slack added on top of the long-poll timeout for the HTTP request itself
const POLL_GRACE: Duration = Duration::from_secs(10);
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramCfg) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.poll_timeout_secs) + POLL_GRACE)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", cfg.api_url.trim_end_matches('/'), cfg.token),
            poll_timeout_secs: cfg.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The method URL embeds the bot token
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;
        unwrap_envelope(method, envelope)
    }

    /// Check the token; used once at startup
    pub async fn get_me(&self) -> Result<BotUser> {
        self.call("getMe", &serde_json::json!({}), Some(SEND_TIMEOUT)).await
    }

    /// Long-poll for message updates starting at `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request, None).await
    }
}

fn unwrap_envelope<T>(method: &str, envelope: ApiEnvelope<T>) -> Result<T> {
    if !envelope.ok {
        return Err(AppError::Telegram(format!(
            "{} failed ({}): {}",
            method,
            envelope.error_code.unwrap_or_default(),
            envelope.description.unwrap_or_default()
        )));
    }

    envelope
        .result
        .ok_or_else(|| AppError::Telegram(format!("{} returned no result", method)))
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest { chat_id, text };
        let _: serde_json::Value = self.call("sendMessage", &request, Some(SEND_TIMEOUT)).await?;
        Ok(())
    }
}
