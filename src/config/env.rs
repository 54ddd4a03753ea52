//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `TELEBRIDGE_BOT_TOKEN` - Telegram bot token
//! - `TELEBRIDGE_CHAT_ID` - Target chat id
//! - `TELEBRIDGE_ENABLED` - Enable outbound relay (`true`/`false`)
//! - `TELEBRIDGE_INBOUND_ENABLED` - Enable inbound commands (`true`/`false`)
//! - `TELEBRIDGE_LINKS_PATH` - Link store location

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "TELEBRIDGE";

/// Apply environment variable overrides to a config.
///
/// This allows the bot token to be provided via the environment
/// instead of living in the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_BOT_TOKEN", ENV_PREFIX)) {
        config.telegram.bot_token = token;
    }
    if let Ok(chat_id) = env::var(format!("{}_CHAT_ID", ENV_PREFIX)) {
        config.telegram.chat_id = chat_id;
    }

    if let Some(enabled) = env_bool(&format!("{}_ENABLED", ENV_PREFIX)) {
        config.telegram.enabled = enabled;
    }
    if let Some(enabled) = env_bool(&format!("{}_INBOUND_ENABLED", ENV_PREFIX)) {
        config.telegram.inbound.enabled = enabled;
    }

    if let Ok(path) = env::var(format!("{}_LINKS_PATH", ENV_PREFIX)) {
        config.links.path = path;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `TELEBRIDGE_CONFIG` environment variable, otherwise returns "telebridge.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "telebridge.conf".to_string())
}

fn env_bool(name: &str) -> Option<bool> {
    parse_bool(&env::var(name).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
