//! Wire types for the subset of the Telegram Bot API the bot uses.
//!
//! Unknown fields are ignored, so only what the bot reads is declared.

use super::TelegramError;
use serde::{Deserialize, Serialize};

/// Chat identifier; for private chats this equals the user's identity
pub type ChatId = i64;

/// Envelope wrapping every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope into the method's result
    pub fn into_result(self, method: &'static str) -> Result<T, TelegramError> {
        if !self.ok {
            return Err(TelegramError::Api {
                method,
                code: self.error_code,
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        self.result.ok_or(TelegramError::MissingResult(method))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
}

impl Message {
    /// The `/command[@bot]` prefix, when the message starts with a bot command
    pub fn command_text(&self) -> Option<&str> {
        let text = self.text.as_deref()?;
        let entity = self
            .entities
            .iter()
            .find(|e| e.kind == "bot_command" && e.offset == 0)?;

        // Entity lengths are counted in UTF-16 code units
        let mut units = 0;
        let mut end = 0;
        for ch in text.chars() {
            if units >= entity.length {
                break;
            }
            units += ch.len_utf16();
            end += ch.len_utf8();
        }

        Some(&text[..end])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
}
