//! Command routing and the single sequential worker.

use crate::commands::Command;
use crate::dispatcher::Dispatcher;
use crate::error::{AppError, AppResult};
use crate::messages::Messages;
use crate::models::UserProfile;
use crate::repositories::UserStore;
use crate::services::{JoinOutcome, MatchOutcome, PairingService, RegistrationService};
use crate::telegram::{Message, Messenger, Update};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How an update was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Join(JoinOutcome),
    Match(MatchOutcome),
    UnknownCommand(String),
}

/// Routes commands to their handlers
pub struct Bot {
    registration: RegistrationService,
    pairing: PairingService,
    dispatcher: Dispatcher,
    messages: Messages,
    username: Option<String>,
}

impl Bot {
    pub fn new(store: Arc<dyn UserStore>, messenger: Arc<dyn Messenger>, messages: Messages) -> Self {
        let dispatcher = Dispatcher::new(messenger);

        Self {
            registration: RegistrationService::new(store.clone(), dispatcher.clone(), messages),
            pairing: PairingService::new(store, dispatcher.clone(), messages),
            dispatcher,
            messages,
            username: None,
        }
    }

    /// Set the bot's own username, so commands addressed to other bots are skipped
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Consume updates one at a time, in arrival order, until the queue closes.
    ///
    /// Each handler finishes, including all of its sends, before the next
    /// update is taken.
    pub async fn run(&self, mut updates: mpsc::Receiver<Update>) {
        info!("Worker started");

        while let Some(update) = updates.recv().await {
            self.handle_update(update).await;
        }

        info!("Update queue closed, worker stopping");
    }

    /// Run the worker until `shutdown` resolves, watching the poller task.
    ///
    /// Returns `Ok` only for a requested shutdown. If the worker or the poller
    /// stops on its own, the poller is aborted and an error is returned.
    pub async fn serve<F>(
        &self,
        updates: mpsc::Receiver<Update>,
        mut poller: JoinHandle<()>,
        shutdown: F,
    ) -> AppResult<()>
    where
        F: Future,
    {
        let outcome = tokio::select! {
            _ = shutdown => {
                info!("Shutdown signal received, shutting down...");
                Ok(())
            }
            res = &mut poller => {
                let reason = match res {
                    Ok(()) => "update poller stopped".to_string(),
                    Err(e) if e.is_panic() => "update poller panicked".to_string(),
                    Err(e) => format!("update poller failed: {}", e),
                };
                error!("{}", reason);
                Err(AppError::Shutdown(reason))
            }
            _ = self.run(updates) => {
                error!("Worker exited unexpectedly");
                Err(AppError::Shutdown("worker exited".to_string()))
            }
        };

        poller.abort();
        outcome
    }

    /// Handle one update; `None` means it was ignored
    pub async fn handle_update(&self, update: Update) -> Option<Handled> {
        let message = update.message?;
        self.handle_message(&message).await
    }

    pub async fn handle_message(&self, message: &Message) -> Option<Handled> {
        let command = Command::from_message(message, self.username.as_deref())?;
        let chat_id = message.chat.id;

        info!(
            chat_id,
            user_id = message.from.as_ref().map(|u| u.id),
            command = command.name(),
            "Received command"
        );

        let handled = match command {
            Command::Join => {
                // Nothing to register without a sender
                let from = message.from.as_ref()?;
                let profile = UserProfile::new(
                    from.id,
                    from.username.clone(),
                    Some(from.first_name.clone()),
                    from.last_name.clone(),
                );
                Handled::Join(self.registration.handle_join(chat_id, &profile).await)
            }
            Command::Match => Handled::Match(self.pairing.handle_match(chat_id).await),
            Command::Unknown(token) => {
                self.dispatcher
                    .notify(chat_id, self.messages.unknown_command())
                    .await;
                Handled::UnknownCommand(token)
            }
        };

        Some(handled)
    }
}
