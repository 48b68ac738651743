use crate::telegram::{ChatId, Messenger};
use std::sync::Arc;
use tracing::warn;

/// Sends notices one by one.
///
/// A failed delivery is logged and reported back as `false`; it never
/// aborts the caller or the sends that follow it.
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Deliver one notice, returning whether it went through
    pub async fn notify(&self, chat_id: ChatId, text: &str) -> bool {
        match self.messenger.send_text(chat_id, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id, "Failed to deliver notice: {}", e);
                false
            }
        }
    }
}
