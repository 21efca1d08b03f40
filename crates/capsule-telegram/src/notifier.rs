//! Periodic sweep that re-attempts delivery to every capsule holder.
//!
//! Before the release date each tick re-sends the "wait N days" reminder to
//! every user with a capsule; after it, each capsule is delivered once.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, trace, warn};

use crate::outbox::Outbox;
use crate::state::BotState;

/// Shortest interval the notifier will sweep at.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Sweeps the capsule store on a fixed interval.
pub struct Notifier<O: Outbox> {
    state: Arc<BotState>,
    outbox: Arc<O>,
    interval: Duration,
    /// Shutdown signal receiver.
    shutdown: watch::Receiver<bool>,
}

impl<O: Outbox> Notifier<O> {
    /// Creates a new notifier.
    ///
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn new(
        state: Arc<BotState>,
        outbox: Arc<O>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                requested_ms = interval.as_millis() as u64,
                "Notify interval too short, using the minimum"
            );
        }
        let interval = interval.max(MIN_INTERVAL);

        Self {
            state,
            outbox,
            interval,
            shutdown,
        }
    }

    /// Run the sweep loop until the shutdown signal.
    ///
    /// The first sweep happens one full interval after start.
    pub async fn run(&mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);

        info!(interval_secs = self.interval.as_secs(), "Notifier started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("Notifier received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!("Notifier stopped");
    }

    /// Sweep once and dispatch whatever the sweep produced.
    async fn tick(&self) {
        let actions = self.state.sweep(Utc::now()).await;
        if actions.is_empty() {
            trace!("No capsules to sweep");
            return;
        }

        debug!(count = actions.len(), "Sweeping capsules");
        self.state.dispatch(self.outbox.as_ref(), actions).await;
    }
}
