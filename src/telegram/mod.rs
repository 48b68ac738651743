//! Messaging platform plumbing: Bot API types, the HTTP client and the
//! `Messenger` seam handlers send through.

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{ChatId, Message, Update, User};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors talking to the Bot API
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} rejected ({code:?}): {description}")]
    Api {
        method: &'static str,
        code: Option<i32>,
        description: String,
    },

    #[error("{0} returned ok without a result")]
    MissingResult(&'static str),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl TelegramError {
    fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TelegramError::Timeout(timeout)
        } else {
            TelegramError::Http(err)
        }
    }
}

/// Outbound text transport
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to one chat
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError>;
}

/// Inbound event source
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch the next batch of updates at or after `offset`
    async fn fetch_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError>;
}
