//! Shared configuration for the time capsule bot.
//!
//! Locates the state directory and the env file holding secrets, and names
//! the environment variables the bot reads.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.time-capsule/
//! └── config/
//!     └── .env.local   # TELEGRAM_BOT_TOKEN and overrides
//! ```
//!
//! Capsules themselves are never written to disk.
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather (`TELEGRAM_TOKEN` also accepted)
//! - `CAPSULE_RELEASE_DATE`: Override the release date (`2025-Sep-02` or `2025-09-02`)
//! - `CAPSULE_NOTIFY_INTERVAL_SECS`: Override the notifier interval
//! - `CAPSULE_STATE_DIR`: Override the base state directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{CapsuleError, Result};

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Older token variable name, still accepted.
pub const LEGACY_TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Environment variable overriding the release date.
pub const RELEASE_DATE_ENV: &str = "CAPSULE_RELEASE_DATE";

/// Environment variable overriding the notifier interval, in seconds.
pub const NOTIFY_INTERVAL_ENV: &str = "CAPSULE_NOTIFY_INTERVAL_SECS";

/// Environment variable for a custom state directory.
pub const STATE_DIR_ENV: &str = "CAPSULE_STATE_DIR";

/// Default notifier interval.
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_secs(30);

/// Default long-poll timeout for the update feed.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_STATE_DIR: &str = ".time-capsule";
const CONFIG_SUBDIR: &str = "config";

/// Get the state directory.
///
/// `CAPSULE_STATE_DIR` if set, else `~/.time-capsule`, else `.time-capsule`
/// in the current directory.
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the `.env.local` file path for secrets.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Load variables from an env file if it exists.
///
/// Variables already set in the process environment win. Returns whether
/// the file was loaded.
pub fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded env file");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            false
        }
    }
}

/// Load the config env file, then a local `.env.local` or `.env`.
pub fn load_env() {
    load_env_file(&env_file());
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// Read the bot token from the environment.
pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .or_else(|_| std::env::var(LEGACY_TOKEN_ENV))
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Parse a notifier interval given in whole seconds.
pub fn parse_interval_secs(input: &str) -> Result<Duration> {
    match input.trim().parse::<u64>() {
        Ok(0) => Err(CapsuleError::InvalidInterval(
            "interval must be at least one second".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(CapsuleError::InvalidInterval(format!("{input:?}: {e}"))),
    }
}
