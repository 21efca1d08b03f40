//! Carries router actions out over the Bot API.

use capsule_core::Outbound;
use futures::future::BoxFuture;
use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::error::Result;
use crate::handlers::reply_keyboard;

/// Something that can perform outbound actions.
///
/// Implemented by [`Bot`]; the notifier and handlers only talk to this trait.
pub trait Outbox: Send + Sync {
    /// Perform one action.
    fn perform<'a>(&'a self, action: &'a Outbound) -> BoxFuture<'a, Result<()>>;
}

impl Outbox for Bot {
    fn perform<'a>(&'a self, action: &'a Outbound) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match action {
                Outbound::Send {
                    chat_id,
                    text,
                    keyboard,
                } => {
                    let mut req = self.send_message(ChatId(*chat_id), text.clone());
                    if *keyboard {
                        req = req.reply_markup(reply_keyboard());
                    }
                    req.await?;
                }
                Outbound::Deliver { chat_id, text, .. } => {
                    self.send_message(ChatId(*chat_id), text.clone()).await?;
                }
                Outbound::Delete {
                    chat_id,
                    message_id,
                } => {
                    self.delete_message(ChatId(*chat_id), MessageId(*message_id))
                        .await?;
                }
            }
            Ok(())
        })
    }
}
