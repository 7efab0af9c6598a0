//! Outbound Telegram Bot API client used by the relay.

use async_trait::async_trait;
use lead_core::RelayConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("telegram request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Telegram API returned HTTP {0}")]
    Status(u16),
    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Seam between the endpoint and the messaging service.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn send_message(&self, config: &RelayConfig, text: &str) -> Result<(), SendError>;
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
    pub disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramSender {
    http: Client,
}

impl TelegramSender {
    /// Builds a sender whose client enforces the connect and total timeouts from `config`.
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MessagingApi for TelegramSender {
    async fn send_message(&self, config: &RelayConfig, text: &str) -> Result<(), SendError> {
        let payload = SendMessageRequest {
            chat_id: &config.chat_id,
            text,
            parse_mode: &config.parse_mode,
            disable_web_page_preview: true,
        };

        let res = self
            .http
            .post(config.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(SendError::Transport)?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "telegram sendMessage rejected");
            return Err(SendError::Status(status.as_u16()));
        }

        let body = res.text().await.map_err(SendError::Transport)?;
        check_api_response(&body)
    }
}

fn check_api_response(body: &str) -> Result<(), SendError> {
    match serde_json::from_str::<TelegramResponse>(body) {
        Ok(TelegramResponse { ok: true, .. }) => Ok(()),
        Ok(TelegramResponse { description, .. }) => Err(SendError::Api(
            description.unwrap_or_else(|| "Unknown Telegram API error".into()),
        )),
        Err(_) => Err(SendError::Api("Unknown Telegram API error".into())),
    }
}
