//! Capsule Core - transport-independent logic for the time capsule bot.
//!
//! - **store**: one capsule per user, released once
//! - **waiting**: chats currently composing a capsule
//! - **release**: the global release date and remaining-day math
//! - **delivery**: the retrieval check shared by users and the notifier
//! - **router**: the idle/composing state machine producing outbound actions
//! - **config**: env file locations and variable names

pub mod config;
pub mod delivery;
pub mod error;
pub mod release;
pub mod router;
pub mod store;
pub mod waiting;

pub use delivery::{deliver, Delivery};
pub use error::{CapsuleError, Result};
pub use release::{ReleaseSchedule, DEFAULT_RELEASE_DATE};
pub use router::{Command, Inbound, InboundKind, Outbound, Router, COMPOSE_LABEL, RETRIEVE_LABEL};
pub use store::{CapsuleStore, Take};
pub use waiting::WaitingTracker;
