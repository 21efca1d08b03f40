//! Time capsule Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p capsule-telegram
//! ```

use std::time::Duration;

use capsule_core::{config, ReleaseSchedule};
use capsule_telegram::{BotConfig, TelegramBot};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Time capsule bot - keeps a message until its release date
#[derive(Parser, Debug)]
#[command(name = "capsule-telegram")]
#[command(about = "Telegram bot that returns your time capsule after the release date")]
struct Args {
    /// Release date, e.g. 2025-Sep-02 (overrides CAPSULE_RELEASE_DATE)
    #[arg(short, long)]
    release_date: Option<String>,

    /// Seconds between notifier sweeps (overrides CAPSULE_NOTIFY_INTERVAL_SECS)
    #[arg(short, long, value_parser = parse_interval)]
    interval: Option<Duration>,

    /// Long-poll timeout in seconds
    #[arg(long, default_value = "60")]
    poll_timeout: u64,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    config::load_env();

    let filter = match args.verbose {
        0 => "capsule_telegram=info,capsule_core=info,teloxide=warn",
        1 => "capsule_telegram=debug,capsule_core=debug,teloxide=info",
        2 => "capsule_telegram=trace,capsule_core=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bot_config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let bot = TelegramBot::new(bot_config.clone());

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[capsule] Time Capsule Bot");
            println!("   Bot: @{}", username);
            println!("   Opens: {}", bot_config.schedule.display_date());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    if let Err(e) = bot.start_polling().await {
        tracing::error!(error = %e, "Bot stopped with an error");
        return Err(e.into());
    }

    Ok(())
}

fn build_config(args: &Args) -> capsule_telegram::Result<BotConfig> {
    let mut bot_config = BotConfig::from_env()?
        .with_poll_timeout(Duration::from_secs(args.poll_timeout));

    if let Some(date) = &args.release_date {
        bot_config = bot_config.with_schedule(ReleaseSchedule::parse(date)?);
    }

    if let Some(interval) = args.interval {
        bot_config = bot_config.with_notify_interval(interval);
    }

    Ok(bot_config)
}

fn parse_interval(input: &str) -> Result<Duration, String> {
    config::parse_interval_secs(input).map_err(|e| e.to_string())
}
