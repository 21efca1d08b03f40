//! Bot configuration.

use std::time::Duration;

use capsule_core::config::{
    parse_interval_secs, token_from_env, DEFAULT_NOTIFY_INTERVAL, DEFAULT_POLL_TIMEOUT,
    NOTIFY_INTERVAL_ENV, RELEASE_DATE_ENV,
};
use capsule_core::ReleaseSchedule;

use crate::error::{Result, TelegramError};

/// Configuration for the Telegram bot.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot API token.
    pub token: String,
    /// When capsules open.
    pub schedule: ReleaseSchedule,
    /// How often the notifier sweeps the store.
    pub notify_interval: Duration,
    /// Long-poll timeout for the update feed.
    pub poll_timeout: Duration,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("schedule", &self.schedule)
            .field("notify_interval", &self.notify_interval)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Creates a config with the built-in release date and default timings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token: token.into(),
            schedule: ReleaseSchedule::builtin()?,
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        })
    }

    /// Build the config from environment variables.
    ///
    /// Requires `TELEGRAM_BOT_TOKEN`. A malformed release date or interval
    /// override is an error rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let token = token_from_env().ok_or(TelegramError::NoToken)?;
        let mut config = Self::new(token)?;

        if let Ok(date) = std::env::var(RELEASE_DATE_ENV) {
            config.schedule = ReleaseSchedule::parse(&date)?;
        }

        if let Ok(secs) = std::env::var(NOTIFY_INTERVAL_ENV) {
            config.notify_interval = parse_interval_secs(&secs)?;
        }

        Ok(config)
    }

    /// Sets the release schedule.
    pub fn with_schedule(mut self, schedule: ReleaseSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the notifier interval.
    pub fn with_notify_interval(mut self, interval: Duration) -> Self {
        self.notify_interval = interval;
        self
    }

    /// Sets the long-poll timeout.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::new("123:abc").unwrap();

        assert_eq!(config.token, "123:abc");
        assert_eq!(config.schedule, ReleaseSchedule::parse("2025-Sep-02").unwrap());
        assert_eq!(config.notify_interval, Duration::from_secs(30));
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let schedule = ReleaseSchedule::parse("2030-01-01").unwrap();
        let config = BotConfig::new("t")
            .unwrap()
            .with_schedule(schedule)
            .with_notify_interval(Duration::from_secs(5))
            .with_poll_timeout(Duration::from_secs(10));

        assert_eq!(config.schedule, schedule);
        assert_eq!(config.notify_interval, Duration::from_secs(5));
        assert_eq!(config.poll_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = BotConfig::new("secret-token").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
