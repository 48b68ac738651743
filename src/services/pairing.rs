//! Pairing rounds.
//!
//! A round shuffles every registered identity and walks the result two at a
//! time. With an odd count the last identity is the leftover.

use crate::dispatcher::Dispatcher;
use crate::messages::Messages;
use crate::models::UserId;
use crate::repositories::UserStore;
use crate::telegram::ChatId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{error, info};

/// Partition of one ordering into pairs plus at most one leftover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRound<T> {
    pub pairs: Vec<(T, T)>,
    pub leftover: Option<T>,
}

impl<T: Copy> PairingRound<T> {
    /// Pair `order[0]` with `order[1]`, `order[2]` with `order[3]`, and so on
    pub fn from_order(order: &[T]) -> Self {
        let mut pairs = Vec::with_capacity(order.len() / 2);
        let mut leftover = None;

        for chunk in order.chunks(2) {
            match chunk {
                [a, b] => pairs.push((*a, *b)),
                [last] => leftover = Some(*last),
                _ => unreachable!("chunks(2) yields one or two elements"),
            }
        }

        Self { pairs, leftover }
    }

    /// Number of identities covered by the round
    pub fn participants(&self) -> usize {
        self.pairs.len() * 2 + usize::from(self.leftover.is_some())
    }
}

/// Shuffle `ids` uniformly and split the result into a round
pub fn shuffle_into_round<T: Copy, R: Rng + ?Sized>(mut ids: Vec<T>, rng: &mut R) -> PairingRound<T> {
    ids.shuffle(rng);
    PairingRound::from_order(&ids)
}

/// Generator reseeded from the wall clock, fresh for every round
pub fn time_seeded_rng() -> StdRng {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos as u64)
}

/// Delivery tally for a completed round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub participants: usize,
    pub pairs: usize,
    pub leftover: bool,
    pub notices_sent: usize,
    pub notices_failed: usize,
}

/// What a `/match` invocation ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Fewer than two participants; only the triggering chat was told
    NotEnoughParticipants { registered: usize },
    Completed(RoundSummary),
    /// The store failed; the triggering chat got the generic failure notice
    Failed,
}

/// Runs pairing rounds over every registered participant
pub struct PairingService {
    store: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    messages: Messages,
}

impl PairingService {
    pub fn new(store: Arc<dyn UserStore>, dispatcher: Dispatcher, messages: Messages) -> Self {
        Self {
            store,
            dispatcher,
            messages,
        }
    }

    /// Handle `/match` from `chat_id` with a freshly seeded generator
    pub async fn handle_match(&self, chat_id: ChatId) -> MatchOutcome {
        let mut rng = time_seeded_rng();
        self.handle_match_with(chat_id, &mut rng).await
    }

    /// Handle `/match` from `chat_id`, shuffling with `rng`
    pub async fn handle_match_with<R: Rng + Send>(&self, chat_id: ChatId, rng: &mut R) -> MatchOutcome {
        let ids = match self.store.list_all_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(chat_id, "Failed to list participants: {}", e);
                self.dispatcher.notify(chat_id, self.messages.failure()).await;
                return MatchOutcome::Failed;
            }
        };

        if ids.len() < 2 {
            info!(chat_id, registered = ids.len(), "Not enough participants to pair");
            self.dispatcher
                .notify(chat_id, self.messages.not_enough_participants())
                .await;
            return MatchOutcome::NotEnoughParticipants {
                registered: ids.len(),
            };
        }

        let round = shuffle_into_round(ids, rng);
        let summary = self.deliver(&round).await;

        info!(
            chat_id,
            participants = summary.participants,
            pairs = summary.pairs,
            leftover = summary.leftover,
            failed = summary.notices_failed,
            "Pairing round complete"
        );

        MatchOutcome::Completed(summary)
    }

    /// Tell every participant of `round` about their partner.
    ///
    /// Each notice is sent on its own; a failed delivery does not stop the
    /// rest of the round.
    pub async fn deliver(&self, round: &PairingRound<UserId>) -> RoundSummary {
        let mut summary = RoundSummary {
            participants: round.participants(),
            pairs: round.pairs.len(),
            leftover: round.leftover.is_some(),
            ..RoundSummary::default()
        };

        let placeholder = self.messages.placeholder_name();

        for &(a, b) in &round.pairs {
            let name_of_b = self.store.lookup_username(b, placeholder).await;
            let name_of_a = self.store.lookup_username(a, placeholder).await;

            for (recipient, partner_name) in [(a, name_of_b), (b, name_of_a)] {
                let text = self.messages.partner(&partner_name);
                summary.record(self.dispatcher.notify(recipient, &text).await);
            }
        }

        if let Some(leftover) = round.leftover {
            summary.record(self.dispatcher.notify(leftover, self.messages.no_partner()).await);
        }

        summary
    }
}

impl RoundSummary {
    fn record(&mut self, delivered: bool) {
        if delivered {
            self.notices_sent += 1;
        } else {
            self.notices_failed += 1;
        }
    }
}
