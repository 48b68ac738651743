#![allow(dead_code)]

use async_trait::async_trait;
use random_coffee::dispatcher::Dispatcher;
use random_coffee::error::{RepositoryError, RepositoryResult};
use random_coffee::messages::{Locale, Messages};
use random_coffee::models::{UserId, UserProfile};
use random_coffee::repositories::UserStore;
use random_coffee::telegram::types::{Chat, MessageEntity};
use random_coffee::telegram::{ChatId, Message, Messenger, TelegramError, Update, User};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// User store kept in memory, with switches to make it fail
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<UserProfile>>,
    pub fail_reads: AtomicBool,
    pub fail_inserts: AtomicBool,
    /// Report "absent" from `exists` even when the row is there
    pub stale_exists: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store pre-populated with participants named `user<id>`
    pub fn with_ids(ids: &[UserId]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut rows = store.rows.lock().unwrap();
            for &id in ids {
                rows.push(UserProfile::new(id, Some(format!("user{}", id)), Some(format!("First{}", id)), None));
            }
        }
        Arc::new(store)
    }

    pub fn add(&self, profile: UserProfile) {
        self.rows.lock().unwrap().push(profile);
    }

    pub fn rows(&self) -> Vec<UserProfile> {
        self.rows.lock().unwrap().clone()
    }

    pub fn count(&self, user_id: UserId) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .count()
    }

    fn check_reads(&self) -> RepositoryResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.check_reads()?;
        if self.stale_exists.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.count(user_id) > 0)
    }

    async fn insert(&self, profile: &UserProfile) -> RepositoryResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("inserts disabled".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.user_id == profile.user_id) {
            return Err(RepositoryError::Duplicate(format!(
                "duplicate key value violates unique constraint (user_id)={}",
                profile.user_id
            )));
        }
        rows.push(profile.clone());
        Ok(())
    }

    async fn list_all_user_ids(&self) -> RepositoryResult<Vec<UserId>> {
        self.check_reads()?;
        Ok(self.rows.lock().unwrap().iter().map(|p| p.user_id).collect())
    }

    async fn find_username(&self, user_id: UserId) -> RepositoryResult<Option<String>> {
        self.check_reads()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|p| p.username.clone()))
    }
}

/// Messenger that records every delivery instead of sending it
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
    failing: Mutex<HashSet<ChatId>>,
}

impl RecordingMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every delivery to `chat_id` fail
    pub fn fail_for(&self, chat_id: ChatId) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn count_text(&self, text: &str) -> usize {
        self.sent().iter().filter(|(_, t)| t == text).count()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(TelegramError::Api {
                method: "sendMessage",
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn english() -> Messages {
    Messages::new(Locale::En)
}

pub fn dispatcher(messenger: &Arc<RecordingMessenger>) -> Dispatcher {
    Dispatcher::new(messenger.clone())
}

pub fn profile(user_id: UserId, username: Option<&str>) -> UserProfile {
    UserProfile::new(
        user_id,
        username.map(str::to_string),
        Some("Test".to_string()),
        Some("User".to_string()),
    )
}

/// Private-chat message from `user_id` with the given text
pub fn text_message(user_id: i64, username: Option<&str>, text: &str) -> Message {
    let entities = if text.starts_with('/') {
        let length = text
            .split_whitespace()
            .next()
            .map(|token| token.encode_utf16().count())
            .unwrap_or(0);
        vec![MessageEntity {
            kind: "bot_command".to_string(),
            offset: 0,
            length,
        }]
    } else {
        Vec::new()
    };

    Message {
        message_id: 1,
        from: Some(User {
            id: user_id,
            is_bot: false,
            first_name: format!("First{}", user_id),
            last_name: None,
            username: username.map(str::to_string),
        }),
        chat: Chat {
            id: user_id,
            kind: "private".to_string(),
        },
        text: Some(text.to_string()),
        entities,
    }
}

pub fn update(update_id: i64, message: Message) -> Update {
    Update {
        update_id,
        message: Some(message),
    }
}
