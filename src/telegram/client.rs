use super::types::{ApiResponse, ChatId, Message, Update, User};
use super::{Messenger, TelegramError, UpdateSource};
use crate::config::TelegramConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

// Slack on top of the long-poll window before the HTTP request itself gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Minimal Telegram Bot API client
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    poll_timeout: Duration,
    send_timeout: Duration,
}

impl TelegramClient {
    /// Create a new client from configuration
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            poll_timeout: config.poll_timeout(),
            send_timeout: config.send_timeout(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<P, R>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Duration,
    ) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TelegramError::from_transport(e, timeout))?;

        // Refusals come back as non-2xx with the same JSON envelope
        let envelope: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| TelegramError::from_transport(e, timeout))?;

        envelope.into_result(method)
    }

    /// Identify the bot; fails when the token is rejected
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), self.send_timeout)
            .await
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let params = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });

        self.call("getUpdates", &params, self.poll_timeout + POLL_GRACE)
            .await
    }

    /// Send a plain text message
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<Message, TelegramError> {
        debug!(chat_id, "sendMessage");
        let params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        self.call("sendMessage", &params, self.send_timeout).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text).await.map(|_| ())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.get_updates(offset).await
    }
}
