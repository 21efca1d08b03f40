//! Tracks which chats are composing a capsule.

use std::collections::HashSet;

/// Set of chat ids whose next free-text message is capsule text.
#[derive(Debug, Default)]
pub struct WaitingTracker {
    chats: HashSet<i64>,
}

impl WaitingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chat as composing.
    pub fn begin_waiting(&mut self, chat_id: i64) {
        self.chats.insert(chat_id);
    }

    /// Clear the composing flag, returning whether it was set.
    pub fn consume_if_waiting(&mut self, chat_id: i64) -> bool {
        self.chats.remove(&chat_id)
    }

    pub fn is_waiting(&self, chat_id: i64) -> bool {
        self.chats.contains(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
