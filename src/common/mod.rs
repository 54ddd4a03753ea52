//! Common utilities and types shared across the application.

pub mod error;
pub mod markdown;
pub mod messages;

pub use messages::{InboundMessage, FALLBACK_NAME};
