//! Telegram bot that keeps a time capsule until its release date.
//!
//! A user presses "Write capsule", sends one message, and the bot keeps it
//! in memory. Pressing "Get capsule" either reports how many days are left
//! or, once the release date has passed, returns the text and forgets it.
//! A background notifier repeats the same check for every stored capsule.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `CAPSULE_RELEASE_DATE`: Release date (default: 2025-Sep-02)
//! - `CAPSULE_NOTIFY_INTERVAL_SECS`: Notifier interval (default: 30)
//!
//! # Example
//!
//! ```no_run
//! use capsule_telegram::{BotConfig, TelegramBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_env()?;
//!     let bot = TelegramBot::new(config);
//!
//!     bot.get_me().await?;
//!     bot.start_polling().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome message and capsule keyboard
//! - `/help` - Explain how capsules work

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod outbox;
pub mod state;

pub use bot::TelegramBot;
pub use config::BotConfig;
pub use error::{Result, TelegramError};
pub use notifier::Notifier;
pub use outbox::Outbox;
pub use state::{create_shared_state, BotState};
