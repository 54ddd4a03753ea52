//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram returned status {status}")]
    Status { status: u16 },

    #[error("Telegram rejected the request: {description}")]
    Api { description: String },

    #[error("Failed to decode Telegram response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Link store persistence errors.
#[derive(Debug, Error)]
pub enum LinkStoreError {
    #[error("Failed to write link store '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize link store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Console input the game adapter cannot turn into an event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command '{verb}'")]
    UnknownCommand { verb: String },

    #[error("'{verb}' needs a player name")]
    MissingPlayer { verb: String },

    #[error("usage: {usage}")]
    Usage { usage: &'static str },
}

/// Result type alias for Telegram operations.
pub type TelegramResult<T> = std::result::Result<T, TelegramError>;

/// Result type alias for link store operations.
pub type LinkStoreResult<T> = std::result::Result<T, LinkStoreError>;
