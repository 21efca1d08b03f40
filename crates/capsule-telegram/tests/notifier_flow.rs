//! Integration tests for the shared state and notifier through the public API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use capsule_core::{Inbound, Outbound, ReleaseSchedule, COMPOSE_LABEL, RETRIEVE_LABEL};
use capsule_telegram::{BotConfig, BotState, Notifier, Outbox, TelegramBot, TelegramError};
use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;
use tokio::sync::watch;

/// Records actions and fails delivery for chosen chats.
#[derive(Default)]
struct FlakyOutbox {
    performed: Mutex<Vec<Outbound>>,
    unreachable: Mutex<Vec<i64>>,
}

impl FlakyOutbox {
    fn performed(&self) -> Vec<Outbound> {
        self.performed.lock().unwrap().clone()
    }

    fn set_unreachable(&self, chats: &[i64]) {
        *self.unreachable.lock().unwrap() = chats.to_vec();
    }
}

impl Outbox for FlakyOutbox {
    fn perform<'a>(&'a self, action: &'a Outbound) -> BoxFuture<'a, capsule_telegram::Result<()>> {
        Box::pin(async move {
            if self.unreachable.lock().unwrap().contains(&action.chat_id()) {
                return Err(TelegramError::SendFailed("bot was blocked by the user".to_string()));
            }
            self.performed.lock().unwrap().push(action.clone());
            Ok(())
        })
    }
}

async fn store_capsule(state: &BotState, user: i64, text: &str) {
    let now = Utc::now();
    state.route(Inbound::text(user, user, 1, COMPOSE_LABEL), now).await;
    state.route(Inbound::text(user, user, 2, text), now).await;
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_user_is_retried_on_next_tick() {
    let state = Arc::new(BotState::new(ReleaseSchedule::parse("2025-Sep-02").unwrap()));
    store_capsule(&state, 1, "for one").await;
    store_capsule(&state, 2, "for two").await;

    let outbox = Arc::new(FlakyOutbox::default());
    outbox.set_unreachable(&[2]);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut notifier = Notifier::new(
        Arc::clone(&state),
        Arc::clone(&outbox),
        Duration::from_secs(10),
        shutdown_rx,
    );
    let handle = tokio::spawn(async move { notifier.run().await });

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(state.capsule(1).await, None);
    assert_eq!(state.capsule(2).await.as_deref(), Some("for two"));

    outbox.set_unreachable(&[]);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(state.capsule_count().await, 0);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("notifier should stop")
        .unwrap();

    let delivered: Vec<String> = outbox
        .performed()
        .into_iter()
        .filter_map(|o| match o {
            Outbound::Deliver { capsule, .. } => Some(capsule),
            _ => None,
        })
        .collect();
    assert_eq!(delivered, vec!["for one".to_string(), "for two".to_string()]);
}

#[tokio::test]
async fn test_retrieve_before_release_keeps_capsule() {
    let state = BotState::new(ReleaseSchedule::parse("2025-Sep-02").unwrap());
    let june = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

    state.route(Inbound::text(3, 3, 1, COMPOSE_LABEL), june).await;
    state.route(Inbound::text(3, 3, 2, "hello future"), june).await;

    let outbox = FlakyOutbox::default();
    let actions = state.route(Inbound::text(3, 3, 3, RETRIEVE_LABEL), june).await;
    state.dispatch(&outbox, actions).await;

    let performed = outbox.performed();
    assert!(performed[0].text().unwrap().contains("93 more days"));
    assert_eq!(state.capsule(3).await.as_deref(), Some("hello future"));
}

#[tokio::test]
async fn test_new_bot_starts_empty() {
    let config = BotConfig::new("123456:TEST").unwrap();
    let bot = TelegramBot::new(config);

    assert_eq!(bot.state().capsule_count().await, 0);
}
