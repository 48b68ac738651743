use crate::dispatcher::Dispatcher;
use crate::error::RepositoryResult;
use crate::messages::Messages;
use crate::models::UserProfile;
use crate::repositories::UserStore;
use crate::telegram::ChatId;
use std::sync::Arc;
use tracing::{error, info};

/// What a join attempt ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Registered,
    AlreadyRegistered,
    /// The store failed; the user got the generic failure notice
    Failed,
}

/// Registers participants on `/start` / `/join`
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    messages: Messages,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn UserStore>, dispatcher: Dispatcher, messages: Messages) -> Self {
        Self {
            store,
            dispatcher,
            messages,
        }
    }

    /// Store the profile unless the identity is already known.
    ///
    /// Never overwrites an existing row. An insert that loses a race to a
    /// concurrent registration of the same identity counts as already
    /// registered.
    pub async fn register(&self, profile: &UserProfile) -> RepositoryResult<JoinOutcome> {
        if self.store.exists(profile.user_id).await? {
            return Ok(JoinOutcome::AlreadyRegistered);
        }

        match self.store.insert(profile).await {
            Ok(()) => Ok(JoinOutcome::Registered),
            Err(e) if e.is_duplicate() => Ok(JoinOutcome::AlreadyRegistered),
            Err(e) => Err(e),
        }
    }

    /// Handle a join command and answer in `chat_id`
    pub async fn handle_join(&self, chat_id: ChatId, profile: &UserProfile) -> JoinOutcome {
        let outcome = match self.register(profile).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(user_id = profile.user_id, "Registration failed: {}", e);
                self.dispatcher.notify(chat_id, self.messages.failure()).await;
                return JoinOutcome::Failed;
            }
        };

        let notice = match outcome {
            JoinOutcome::Registered => {
                info!(user_id = profile.user_id, "Registered new participant");
                self.messages.registered()
            }
            _ => self.messages.already_registered(),
        };
        self.dispatcher.notify(chat_id, notice).await;

        outcome
    }
}
