//! Routes inbound chat events to store and tracker operations.
//!
//! The router is transport-independent: it consumes [`Inbound`] events and
//! produces [`Outbound`] actions that a transport adapter carries out. Each
//! chat is either idle or composing:
//!
//! ```text
//! Idle      --[compose label]-->   Composing   (prompt)
//! Composing --[any free text]-->   Idle        (store capsule, confirm)
//! Idle      --[retrieve label]-->  Idle        (delivery attempt)
//! Idle      --[other free text]--> Idle        (fallback message)
//! ```
//!
//! Commands are answered in either state and never change it.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::delivery::{deliver, Delivery};
use crate::release::ReleaseSchedule;
use crate::store::CapsuleStore;
use crate::waiting::WaitingTracker;

/// Reply keyboard label that starts composing a capsule.
pub const COMPOSE_LABEL: &str = "Write capsule";

/// Reply keyboard label that asks for the stored capsule.
pub const RETRIEVE_LABEL: &str = "Get capsule";

const WELCOME_TEXT: &str = "Hi there, friend! 🌟 I'm your time capsule helper! \
Write your time capsule and I'll keep it safe for you!";

const HELP_TEXT: &str = "🤗 Hi! I'm here to help you with time capsules! Here's what you can do:\n\n\
1️⃣ Write a capsule: press 'Write capsule' and I'll keep your thoughts and dreams for the future!\n\n\
2️⃣ Get your capsule: when the time comes, press 'Get capsule' to open it. I'll remind you about it too!\n\n\
If you have any questions, just write to me and I'll do my best to help! 🌈";

const PROMPT_TEXT: &str = "Hooray! 🎉 Please write your time capsule. I can't wait to read your words!";

const SAVED_TEXT: &str = "Time capsule saved! 🎊 Now it will wait for its time!";

const FALLBACK_TEXT: &str = "Oops, I didn't quite get that. Could you try again? 🤔 \
Or use /help to see what I can do";

/// Commands the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

/// What an inbound message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// A recognized command.
    Command(Command),
    /// A `/command` the bot does not know.
    UnknownCommand(String),
    /// Free text, including the two keyboard labels.
    Text(String),
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: i64,
    pub user_id: i64,
    pub message_id: i32,
    pub kind: InboundKind,
}

impl Inbound {
    pub fn text(chat_id: i64, user_id: i64, message_id: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            message_id,
            kind: InboundKind::Text(text.into()),
        }
    }

    pub fn command(chat_id: i64, user_id: i64, message_id: i32, command: Command) -> Self {
        Self {
            chat_id,
            user_id,
            message_id,
            kind: InboundKind::Command(command),
        }
    }
}

/// An action for the transport to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send a text message, optionally with the two-button reply keyboard.
    Send {
        chat_id: i64,
        text: String,
        keyboard: bool,
    },
    /// Send a released capsule. The capsule travels with the message so it
    /// can be restored if sending fails.
    Deliver {
        chat_id: i64,
        user_id: i64,
        capsule: String,
        text: String,
    },
    /// Delete a message from the chat.
    Delete { chat_id: i64, message_id: i32 },
}

impl Outbound {
    fn send(chat_id: i64, text: impl Into<String>) -> Self {
        Outbound::Send {
            chat_id,
            text: text.into(),
            keyboard: false,
        }
    }

    /// Chat the action targets.
    pub fn chat_id(&self) -> i64 {
        match self {
            Outbound::Send { chat_id, .. }
            | Outbound::Deliver { chat_id, .. }
            | Outbound::Delete { chat_id, .. } => *chat_id,
        }
    }

    /// Message text, if the action sends one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Outbound::Send { text, .. } | Outbound::Deliver { text, .. } => Some(text),
            Outbound::Delete { .. } => None,
        }
    }
}

/// Owns the capsule store, the composing flags and the release schedule.
#[derive(Debug)]
pub struct Router {
    store: CapsuleStore,
    waiting: WaitingTracker,
    schedule: ReleaseSchedule,
}

impl Router {
    pub fn new(schedule: ReleaseSchedule) -> Self {
        Self {
            store: CapsuleStore::new(),
            waiting: WaitingTracker::new(),
            schedule,
        }
    }

    pub fn store(&self) -> &CapsuleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CapsuleStore {
        &mut self.store
    }

    pub fn waiting(&self) -> &WaitingTracker {
        &self.waiting
    }

    pub fn schedule(&self) -> &ReleaseSchedule {
        &self.schedule
    }

    /// Handle one inbound message at `now`.
    pub fn route(&mut self, inbound: Inbound, now: DateTime<Utc>) -> Vec<Outbound> {
        let Inbound {
            chat_id,
            user_id,
            message_id,
            kind,
        } = inbound;

        match kind {
            InboundKind::Command(Command::Start) => {
                info!(chat_id, user_id, "user started bot");
                vec![Outbound::Send {
                    chat_id,
                    text: WELCOME_TEXT.to_string(),
                    keyboard: true,
                }]
            }
            InboundKind::Command(Command::Help) => vec![Outbound::send(chat_id, HELP_TEXT)],
            InboundKind::UnknownCommand(name) => {
                debug!(chat_id, command = %name, "unknown command");
                vec![Outbound::send(
                    chat_id,
                    format!("Unknown command: {}\n\nUse /help to see available commands.", name),
                )]
            }
            InboundKind::Text(text) => self.route_text(chat_id, user_id, message_id, text, now),
        }
    }

    fn route_text(
        &mut self,
        chat_id: i64,
        user_id: i64,
        message_id: i32,
        text: String,
        now: DateTime<Utc>,
    ) -> Vec<Outbound> {
        if text == COMPOSE_LABEL {
            self.waiting.begin_waiting(chat_id);
            debug!(chat_id, "composing started");
            return vec![Outbound::send(chat_id, PROMPT_TEXT)];
        }

        if text == RETRIEVE_LABEL {
            return vec![self.deliver_to(user_id, now)];
        }

        if self.waiting.consume_if_waiting(chat_id) {
            self.store.put(user_id, text);
            info!(chat_id, user_id, capsules = self.store.len(), "capsule saved");
            return vec![
                Outbound::Delete {
                    chat_id,
                    message_id,
                },
                Outbound::send(chat_id, SAVED_TEXT),
            ];
        }

        vec![Outbound::send(chat_id, FALLBACK_TEXT)]
    }

    /// Run the delivery check for one user.
    ///
    /// The reply is addressed to the user id; in private chats it equals
    /// the chat id.
    pub fn deliver_to(&mut self, user_id: i64, now: DateTime<Utc>) -> Outbound {
        let delivery = deliver(&mut self.store, user_id, now, &self.schedule);
        let text = delivery.render(&self.schedule);

        match delivery {
            Delivery::Released(capsule) => {
                info!(user_id, "capsule delivered");
                Outbound::Deliver {
                    chat_id: user_id,
                    user_id,
                    capsule,
                    text,
                }
            }
            Delivery::Wait { days } => {
                debug!(user_id, days, "capsule still sealed");
                Outbound::send(user_id, text)
            }
            Delivery::Empty => Outbound::send(user_id, text),
        }
    }

    /// Attempt delivery for every user holding a capsule.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<Outbound> {
        self.store
            .user_ids()
            .into_iter()
            .map(|user_id| self.deliver_to(user_id, now))
            .collect()
    }
}
