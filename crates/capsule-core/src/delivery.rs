//! The retrieval check shared by user requests and the notifier sweep.

use chrono::{DateTime, Utc};

use crate::release::{days_in, ReleaseSchedule};
use crate::store::{CapsuleStore, Take};

/// Result of a delivery attempt for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing stored for this user.
    Empty,
    /// A capsule is stored but still sealed.
    Wait { days: i64 },
    /// The capsule was released and removed from the store.
    Released(String),
}

impl Delivery {
    /// Render the message sent to the user for this outcome.
    pub fn render(&self, schedule: &ReleaseSchedule) -> String {
        match self {
            Delivery::Empty => {
                "You don't have a time capsule yet. Let's write one together! ✍️".to_string()
            }
            Delivery::Wait { days } => format!(
                "Hold on, {} more days until {}! ⏳ Don't worry, your capsule will be ready soon!",
                days,
                schedule.display_date()
            ),
            Delivery::Released(text) => format!(
                "Here is your time capsule: {} 🎈 I hope it brings you joy!",
                text
            ),
        }
    }
}

/// Attempt delivery of a user's capsule at `now`.
///
/// A released capsule is removed from the store; otherwise the store is
/// left untouched.
pub fn deliver(
    store: &mut CapsuleStore,
    user_id: i64,
    now: DateTime<Utc>,
    schedule: &ReleaseSchedule,
) -> Delivery {
    match store.take_if_ready(user_id, now, schedule.release()) {
        Take::Missing => Delivery::Empty,
        Take::Pending(remaining) => Delivery::Wait {
            days: days_in(remaining),
        },
        Take::Ready(text) => Delivery::Released(text),
    }
}
