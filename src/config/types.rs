//! Configuration type definitions.

use serde::Deserialize;

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default location of the Telegram <-> game link store.
pub const DEFAULT_LINKS_PATH: &str = "config/telebridge-links.json";

/// Placeholder token shipped in the sample config.
pub const PLACEHOLDER_BOT_TOKEN: &str = "PUT_YOUR_BOT_TOKEN_HERE";

/// Placeholder chat id shipped in the sample config.
pub const PLACEHOLDER_CHAT_ID: &str = "PUT_YOUR_CHAT_ID_HERE";

/// Smallest accepted long-poll timeout, in seconds.
pub const MIN_POLL_SECONDS: u32 = 1;

/// Largest accepted long-poll timeout, in seconds.
pub const MAX_POLL_SECONDS: u32 = 50;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub service: ServiceConfig,
    pub links: LinksConfig,
}

impl Config {
    /// True when outbound messages can actually be delivered.
    pub fn has_outbound(&self) -> bool {
        self.telegram.enabled
            && !self.telegram.bot_token.trim().is_empty()
            && !self.telegram.chat_id.trim().is_empty()
    }

    /// True when inbound polling is switched on.
    pub fn inbound_enabled(&self) -> bool {
        self.telegram.inbound.enabled
    }

    /// Inbound command prefix, falling back to `/` when blank.
    pub fn command_prefix(&self) -> &str {
        let prefix = self.telegram.inbound.prefix.as_str();
        if prefix.trim().is_empty() {
            "/"
        } else {
            prefix
        }
    }
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    pub use_markdown_v2: bool,
    /// Base URL of the Bot API, without the `/bot<token>` part.
    pub api_base: String,
    pub inbound: InboundConfig,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: PLACEHOLDER_BOT_TOKEN.to_string(),
            chat_id: PLACEHOLDER_CHAT_ID.to_string(),
            use_markdown_v2: true,
            api_base: DEFAULT_API_BASE.to_string(),
            inbound: InboundConfig::default(),
        }
    }
}

/// Telegram -> game command settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InboundConfig {
    pub enabled: bool,
    /// Long-poll timeout (1..=50).
    pub poll_seconds: u32,
    pub prefix: String,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_seconds: 20,
            prefix: "/".to_string(),
        }
    }
}

/// Which game events are forwarded to Telegram.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub chat: bool,
    pub join_quit: bool,
    pub deaths: bool,
    pub start_stop: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chat: true,
            join_quit: true,
            deaths: true,
            start_stop: true,
        }
    }
}

/// Link store settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinksConfig {
    pub path: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_LINKS_PATH.to_string(),
        }
    }
}
