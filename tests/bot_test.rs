mod helpers;

use async_trait::async_trait;
use helpers::*;
use random_coffee::bot::{Bot, Handled};
use random_coffee::poller::UpdatePoller;
use random_coffee::services::{JoinOutcome, MatchOutcome};
use random_coffee::telegram::{TelegramError, Update, UpdateSource};
use random_coffee::AppError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

fn bot(store: &Arc<MemoryUserStore>, messenger: &Arc<RecordingMessenger>) -> Bot {
    Bot::new(store.clone(), messenger.clone(), english()).with_username("coffee_bot")
}

#[tokio::test]
async fn test_start_and_join_register() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let first = bot.handle_message(&text_message(1, Some("ann"), "/start")).await;
    let second = bot.handle_message(&text_message(1, Some("ann"), "/join")).await;

    assert_eq!(first, Some(Handled::Join(JoinOutcome::Registered)));
    assert_eq!(second, Some(Handled::Join(JoinOutcome::AlreadyRegistered)));
    assert_eq!(store.count(1), 1);
    assert_eq!(store.rows()[0].first_name.as_deref(), Some("First1"));
}

#[tokio::test]
async fn test_match_command_runs_round() {
    let store = MemoryUserStore::with_ids(&[1, 2]);
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let handled = bot.handle_message(&text_message(1, Some("user1"), "/match")).await;

    match handled {
        Some(Handled::Match(MatchOutcome::Completed(summary))) => assert_eq!(summary.pairs, 1),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(messenger.sent_to(1), vec![english().partner("user2")]);
    assert_eq!(messenger.sent_to(2), vec![english().partner("user1")]);
}

#[tokio::test]
async fn test_unknown_command_reply() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let handled = bot.handle_message(&text_message(7, None, "/help me")).await;

    assert_eq!(handled, Some(Handled::UnknownCommand("help".to_string())));
    assert_eq!(messenger.sent_to(7), vec![english().unknown_command().to_string()]);
}

#[tokio::test]
async fn test_plain_text_is_ignored() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    assert_eq!(bot.handle_message(&text_message(7, None, "hello there")).await, None);
    assert_eq!(
        bot.handle_update(Update {
            update_id: 3,
            message: None
        })
        .await,
        None
    );
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn test_command_for_another_bot_is_ignored() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let ignored = bot.handle_message(&text_message(7, None, "/start@other_bot")).await;
    let ours = bot.handle_message(&text_message(7, None, "/start@coffee_bot")).await;

    assert_eq!(ignored, None);
    assert_eq!(ours, Some(Handled::Join(JoinOutcome::Registered)));
}

#[tokio::test]
async fn test_join_without_sender_is_ignored() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let mut message = text_message(7, None, "/start");
    message.from = None;

    assert_eq!(bot.handle_message(&message).await, None);
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn test_worker_handles_updates_in_order() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let (sender, receiver) = mpsc::channel(4);
    let producer = tokio::spawn(async move {
        sender.send(update(1, text_message(1, Some("ann"), "/match"))).await.unwrap();
        sender.send(update(2, text_message(1, Some("ann"), "/start"))).await.unwrap();
        sender.send(update(3, text_message(2, Some("bob"), "/start"))).await.unwrap();
        sender.send(update(4, text_message(2, Some("bob"), "/match"))).await.unwrap();
    });

    // Returns once the producer is done and the queue drains
    tokio::time::timeout(Duration::from_secs(5), bot.run(receiver))
        .await
        .expect("worker did not stop after the queue closed");
    producer.await.unwrap();

    let m = english();
    assert_eq!(
        messenger.sent_to(1),
        vec![
            m.not_enough_participants().to_string(),
            m.registered().to_string(),
            m.partner("bob"),
        ]
    );
    assert_eq!(
        messenger.sent_to(2),
        vec![m.registered().to_string(), m.partner("ann")]
    );
}

/// Update source replaying canned batches and recording requested offsets
struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
    offsets: Mutex<Vec<Option<i64>>>,
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn fetch_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Vec::new())
            }
        }
    }
}

#[tokio::test]
async fn test_poller_advances_offset_and_survives_errors() {
    let source = Arc::new(ScriptedSource {
        batches: Mutex::new(VecDeque::from(vec![
            Ok(vec![
                update(10, text_message(1, None, "/start")),
                update(11, text_message(2, None, "/start")),
            ]),
            Err(TelegramError::MissingResult("getUpdates")),
            Ok(vec![update(12, text_message(3, None, "/match"))]),
        ])),
        offsets: Mutex::new(Vec::new()),
    });

    let (sender, mut receiver) = mpsc::channel(8);
    let poller = UpdatePoller::new(source.clone(), sender).with_retry_delay(Duration::from_millis(1));
    let handle = tokio::spawn(poller.start());

    let mut received = Vec::new();
    for _ in 0..3 {
        let update = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .expect("poller stalled")
            .expect("queue closed early");
        received.push(update.update_id);
    }
    assert_eq!(received, vec![10, 11, 12]);

    drop(receiver);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller did not stop after the worker went away")
        .unwrap();

    let offsets = source.offsets.lock().unwrap().clone();
    assert_eq!(&offsets[..3], &[None, Some(12), Some(12)]);
    assert!(offsets[3..].iter().all(|o| *o == Some(13)));
}

#[tokio::test]
async fn test_serve_fails_when_poller_panics() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let (_sender, receiver) = mpsc::channel::<Update>(4);
    let poller = tokio::spawn(async {
        panic!("fetch_updates blew up");
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        bot.serve(receiver, poller, std::future::pending::<()>()),
    )
    .await
    .expect("serve did not notice the dead poller");

    assert!(matches!(result, Err(AppError::Shutdown(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_serve_fails_when_queue_closes() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    // Sender dropped right away, so the worker runs out of updates
    let (_, receiver) = mpsc::channel::<Update>(4);
    let poller = tokio::spawn(std::future::pending::<()>());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        bot.serve(receiver, poller, std::future::pending::<()>()),
    )
    .await
    .expect("serve did not notice the stopped worker");

    assert!(matches!(result, Err(AppError::Shutdown(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_serve_returns_ok_on_shutdown_signal() {
    let store = MemoryUserStore::new();
    let messenger = RecordingMessenger::new();
    let bot = bot(&store, &messenger);

    let (sender, receiver) = mpsc::channel::<Update>(4);
    let poller = tokio::spawn(async move {
        // Holds the queue open like a live poller
        let _sender = sender;
        std::future::pending::<()>().await;
    });

    let result = tokio::time::timeout(Duration::from_secs(5), bot.serve(receiver, poller, async {}))
        .await
        .expect("serve ignored the shutdown signal");

    assert!(result.is_ok());
}
