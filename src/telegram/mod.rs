//! Telegram Bot API integration.
//!
//! Sends service messages and replies to the configured chat and long-polls
//! it for inbound commands.

pub mod gateway;
pub mod poller;
pub mod sender;
pub mod types;

pub use gateway::{HttpGateway, TelegramGateway};
pub use poller::Poller;
