//! Relay configuration sourced from the process environment.

use std::time::Duration;

use time::UtcOffset;
use time::macros::{format_description, offset};

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
pub const API_BASE_ENV: &str = "TELEGRAM_API_BASE";
pub const PARSE_MODE_ENV: &str = "TELEGRAM_PARSE_MODE";
pub const UTC_OFFSET_ENV: &str = "RELAY_UTC_OFFSET";

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_PARSE_MODE: &str = "HTML";
/// Notifications are stamped in Moscow time.
pub const DEFAULT_UTC_OFFSET: UtcOffset = offset!(+3);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Missing required environment variables: TELEGRAM_BOT_TOKEN and/or TELEGRAM_CHAT_ID"
    )]
    MissingCredentials,
    #[error("invalid RELAY_UTC_OFFSET value `{0}`, expected +HH:MM")]
    InvalidOffset(String),
}

/// Everything the relay needs to reach the Telegram chat.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
    pub parse_mode: String,
    pub utc_offset: UtcOffset,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("parse_mode", &self.parse_mode)
            .field("utc_offset", &self.utc_offset)
            .finish_non_exhaustive()
    }
}

impl RelayConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.into(),
            parse_mode: DEFAULT_PARSE_MODE.into(),
            utc_offset: DEFAULT_UTC_OFFSET,
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// ```
    /// use lead_core::RelayConfig;
    ///
    /// let cfg = RelayConfig::from_lookup(|key| match key {
    ///     "TELEGRAM_BOT_TOKEN" => Some("123:abc".into()),
    ///     "TELEGRAM_CHAT_ID" => Some("-100".into()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(cfg.api_base, "https://api.telegram.org");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(bot_token), Some(chat_id)) = (non_empty(BOT_TOKEN_ENV), non_empty(CHAT_ID_ENV))
        else {
            return Err(ConfigError::MissingCredentials);
        };

        let mut cfg = Self::new(bot_token, chat_id);
        if let Some(api_base) = non_empty(API_BASE_ENV) {
            cfg.api_base = api_base;
        }
        if let Some(parse_mode) = non_empty(PARSE_MODE_ENV) {
            cfg.parse_mode = parse_mode;
        }
        if let Some(raw) = non_empty(UTC_OFFSET_ENV) {
            cfg.utc_offset = parse_offset(&raw)?;
        }
        Ok(cfg)
    }

    /// `sendMessage` URL for the configured bot.
    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

fn parse_offset(raw: &str) -> Result<UtcOffset, ConfigError> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw.trim(), &format).map_err(|_| ConfigError::InvalidOffset(raw.to_string()))
}
