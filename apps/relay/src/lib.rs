//! Relay endpoint: validates landing-page leads and forwards them to a Telegram chat.
//!
//! The endpoint never retries; a failed delivery is reported as a 500 and the browser keeps the
//! lead in its own pending queue.

pub mod config;
pub mod error;
pub mod http;
pub mod telegram;

pub use config::ServerConfig;
pub use error::RelayError;
pub use http::{LEGACY_SEND_MESSAGE_PATH, RelayState, SEND_MESSAGE_PATH, relay_router};
pub use telegram::{MessagingApi, SendError, TelegramSender};
