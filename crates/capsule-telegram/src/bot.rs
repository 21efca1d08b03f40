//! Main Telegram bot implementation.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::error::{Result, TelegramError};
use crate::handlers::{
    handle_command, handle_message, handle_unknown_command, is_bot_command, Command,
};
use crate::notifier::Notifier;
use crate::state::{create_shared_state, BotState};

/// Delay between shutdown attempts while the dispatcher is still starting.
const SHUTDOWN_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// The time capsule Telegram bot.
pub struct TelegramBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers and the notifier.
    state: Arc<BotState>,
    config: BotConfig,
}

impl TelegramBot {
    /// Create a new TelegramBot from configuration.
    pub fn new(config: BotConfig) -> Self {
        let bot = Bot::new(config.token.clone());
        let state = create_shared_state(config.schedule);

        Self { bot, state, config }
    }

    /// Shared state handle.
    pub fn state(&self) -> Arc<BotState> {
        Arc::clone(&self.state)
    }

    /// Get the bot's username, verifying the token.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Make sure the long-poll feed is available.
    ///
    /// Telegram refuses `getUpdates` while a webhook is registered, so any
    /// webhook is removed first.
    async fn acquire_feed(&self) -> Result<()> {
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| TelegramError::FeedUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Start the bot in polling mode.
    ///
    /// Runs until SIGINT/SIGTERM, then stops the notifier and the dispatcher
    /// and returns once both have finished.
    pub async fn start_polling(&self) -> Result<()> {
        self.acquire_feed().await?;

        info!(
            release = %self.config.schedule.release(),
            notify_interval_secs = self.config.notify_interval.as_secs(),
            "Starting Telegram bot in polling mode..."
        );

        let bot = self.bot.clone();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Start the notifier task
        let mut notifier = Notifier::new(
            Arc::clone(&self.state),
            Arc::new(bot.clone()),
            self.config.notify_interval,
            shutdown_rx,
        );
        let notifier_handle = tokio::spawn(async move {
            notifier.run().await;
        });

        let state_for_commands = Arc::clone(&self.state);
        let state_for_unknown = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Tagged as a command but didn't parse as a known one
                        msg.text().is_some() && is_bot_command(&msg)
                    })
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_unknown);
                        async move { handle_unknown_command(bot, msg, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Ignoring non-text update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error occurred in an update handler",
            ))
            .build();

        // Translate process signals into a coordinated shutdown
        let shutdown_tx = Arc::new(shutdown_tx);
        let signal_shutdown = Arc::clone(&shutdown_tx);
        let shutdown_token = dispatcher.shutdown_token();
        let signal_task = tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");

            let _ = signal_shutdown.send(true);
            shutdown_when_running(|| shutdown_token.shutdown()).await;
        });

        let listener = Polling::builder(bot).timeout(self.config.poll_timeout).build();

        info!("Bot is running! Send /start to begin.");

        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;

        // The update stream may also end without a signal
        signal_task.abort();
        let _ = shutdown_tx.send(true);

        debug!("Waiting for notifier to stop");
        notifier_handle.await.map_err(|e| {
            error!(error = %e, "Notifier task panicked");
            TelegramError::Shutdown(format!("notifier task panicked: {}", e))
        })?;

        info!(capsules = self.state.capsule_count().await, "Bot stopped");
        Ok(())
    }
}

/// Keep requesting shutdown until the dispatcher accepts it, then wait for it.
///
/// A signal can arrive before the dispatcher has started; the request is
/// then refused as idle and must be repeated.
async fn shutdown_when_running<F, Fut, E>(mut request: F)
where
    F: FnMut() -> std::result::Result<Fut, E>,
    Fut: Future<Output = ()>,
    E: Display,
{
    loop {
        match request() {
            Ok(done) => {
                done.await;
                return;
            }
            Err(e) => {
                debug!(error = %e, "Dispatcher not running yet, retrying shutdown");
                tokio::time::sleep(SHUTDOWN_RETRY_INTERVAL).await;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM (Ctrl-C elsewhere).
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for SIGTERM, only Ctrl-C will stop the bot");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
