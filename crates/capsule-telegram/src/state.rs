//! Shared state for the Telegram bot.

use std::sync::Arc;

use capsule_core::{Inbound, Outbound, ReleaseSchedule, Router};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::outbox::Outbox;

/// Shared state for the bot, accessible from handlers and the notifier.
///
/// The router owns both the capsule store and the composing flags, so a
/// single mutex covers every read and write. Actions are computed under the
/// lock and carried out after it is released.
pub struct BotState {
    router: Mutex<Router>,
}

impl BotState {
    /// Create state releasing capsules on the given schedule.
    pub fn new(schedule: ReleaseSchedule) -> Self {
        Self {
            router: Mutex::new(Router::new(schedule)),
        }
    }

    /// Route one inbound message.
    pub async fn route(&self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Outbound> {
        self.router.lock().await.route(inbound, now)
    }

    /// Run a delivery attempt for every stored capsule.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Vec<Outbound> {
        self.router.lock().await.sweep(now)
    }

    /// Number of stored capsules.
    pub async fn capsule_count(&self) -> usize {
        self.router.lock().await.store().len()
    }

    /// Look up a stored capsule.
    pub async fn capsule(&self, user_id: i64) -> Option<String> {
        self.router.lock().await.store().get(user_id).map(str::to_string)
    }

    /// Whether a chat is composing a capsule.
    pub async fn is_composing(&self, chat_id: i64) -> bool {
        self.router.lock().await.waiting().is_waiting(chat_id)
    }

    /// Put a capsule back if its delivery could not be sent.
    pub async fn restore(&self, user_id: i64, capsule: String) {
        let restored = self.router.lock().await.store_mut().restore(user_id, capsule);
        if restored {
            info!(user_id, "Capsule kept for a later delivery attempt");
        } else {
            debug!(user_id, "Newer capsule stored meanwhile, not restoring");
        }
    }

    /// Carry out actions through the outbox.
    ///
    /// Failures are logged and never stop the remaining actions. A failed
    /// delivery puts the capsule back into the store.
    pub async fn dispatch<O>(&self, outbox: &O, actions: Vec<Outbound>)
    where
        O: Outbox + ?Sized,
    {
        for action in actions {
            let result = outbox.perform(&action).await;
            match result {
                Ok(()) => {
                    debug!(chat_id = action.chat_id(), "Action performed");
                }
                Err(e) => {
                    warn!(chat_id = action.chat_id(), error = %e, "Failed to perform action");
                    if let Outbound::Deliver { user_id, capsule, .. } = action {
                        self.restore(user_id, capsule).await;
                    }
                }
            }
        }
    }
}

/// Create a shared state instance.
pub fn create_shared_state(schedule: ReleaseSchedule) -> Arc<BotState> {
    Arc::new(BotState::new(schedule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbox::testing::RecordingOutbox;
    use capsule_core::{COMPOSE_LABEL, RETRIEVE_LABEL};
    use chrono::TimeZone;

    fn schedule() -> ReleaseSchedule {
        ReleaseSchedule::parse("2025-Sep-02").unwrap()
    }

    fn after() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 3, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_route_through_state() {
        let state = BotState::new(schedule());
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        state.route(Inbound::text(5, 5, 1, COMPOSE_LABEL), now).await;
        assert!(state.is_composing(5).await);

        state.route(Inbound::text(5, 5, 2, "note to self"), now).await;
        assert!(!state.is_composing(5).await);
        assert_eq!(state.capsule(5).await.as_deref(), Some("note to self"));
    }

    #[tokio::test]
    async fn test_failed_delivery_restores_capsule() {
        let state = BotState::new(schedule());
        state.route(Inbound::text(5, 5, 1, COMPOSE_LABEL), after()).await;
        state.route(Inbound::text(5, 5, 2, "keep me"), after()).await;

        let actions = state.route(Inbound::text(5, 5, 3, RETRIEVE_LABEL), after()).await;
        assert_eq!(state.capsule_count().await, 0);

        let outbox = RecordingOutbox::failing();
        state.dispatch(&outbox, actions).await;
        assert_eq!(state.capsule(5).await.as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn test_successful_delivery_is_final() {
        let state = BotState::new(schedule());
        state.route(Inbound::text(5, 5, 1, COMPOSE_LABEL), after()).await;
        state.route(Inbound::text(5, 5, 2, "bye"), after()).await;

        let outbox = RecordingOutbox::new();
        let actions = state.sweep(after()).await;
        state.dispatch(&outbox, actions).await;

        assert_eq!(state.capsule_count().await, 0);
        assert_eq!(outbox.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_plain_send_changes_nothing() {
        let state = BotState::new(schedule());
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let actions = state.route(Inbound::text(5, 5, 1, "hello?"), now).await;

        state.dispatch(&RecordingOutbox::failing(), actions).await;
        assert_eq!(state.capsule_count().await, 0);
        assert!(!state.is_composing(5).await);
    }
}
