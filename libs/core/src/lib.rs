//! Lead relay core contracts and value types.
//!
//! This crate holds the data exchanged between the landing-page client and the relay endpoint,
//! the field validation both sides agree on, and the notification text sent to Telegram.
pub mod config;
pub mod format;
pub mod types;
pub mod validate;

pub use config::*;
pub use format::*;
pub use types::*;
pub use validate::*;
