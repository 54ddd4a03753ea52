//! Configuration validation.
//!
//! Rejects values the bridge cannot work with and normalizes the ones it
//! can recover from, logging what it changed.

use tracing::warn;

use crate::common::error::ConfigError;
use crate::config::types::{
    Config, MAX_POLL_SECONDS, MIN_POLL_SECONDS, PLACEHOLDER_BOT_TOKEN, PLACEHOLDER_CHAT_ID,
};

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let prefix = &config.telegram.inbound.prefix;
    if prefix.chars().any(char::is_whitespace) {
        errors.push(format!(
            "telegram.inbound.prefix '{}' must not contain whitespace",
            prefix
        ));
    }

    if config.telegram.api_base.trim().is_empty() {
        errors.push("telegram.api_base is required".to_string());
    }

    if config.links.path.trim().is_empty() {
        errors.push("links.path is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

/// Bring recoverable values back into range.
///
/// Placeholders are blanked so the affected direction degrades to a no-op
/// instead of talking to Telegram with a bogus token.
pub fn normalize_config(mut config: Config) -> Config {
    let seconds = config.telegram.inbound.poll_seconds;
    let clamped = seconds.clamp(MIN_POLL_SECONDS, MAX_POLL_SECONDS);
    if clamped != seconds {
        warn!(
            "telegram.inbound.poll_seconds {} is outside {}..={}, using {}",
            seconds, MIN_POLL_SECONDS, MAX_POLL_SECONDS, clamped
        );
        config.telegram.inbound.poll_seconds = clamped;
    }

    if config.telegram.bot_token == PLACEHOLDER_BOT_TOKEN {
        if config.telegram.enabled {
            warn!("telegram.bot_token has not been configured (still using placeholder)");
        }
        config.telegram.bot_token.clear();
    }
    if config.telegram.chat_id == PLACEHOLDER_CHAT_ID {
        if config.telegram.enabled {
            warn!("telegram.chat_id has not been configured (still using placeholder)");
        }
        config.telegram.chat_id.clear();
    }

    config.telegram.chat_id = config.telegram.chat_id.trim().to_string();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_config() -> Config {
        let mut config = Config::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = "123:abc".to_string();
        config.telegram.chat_id = "-100987".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_whitespace_prefix_fails() {
        let mut config = make_valid_config();
        config.telegram.inbound.prefix = "! ".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("prefix"));
    }

    #[test]
    fn test_empty_links_path_fails() {
        let mut config = make_valid_config();
        config.links.path = String::new();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("links.path"));
    }

    #[test]
    fn test_poll_seconds_clamped() {
        let mut config = make_valid_config();
        config.telegram.inbound.poll_seconds = 0;
        assert_eq!(normalize_config(config.clone()).telegram.inbound.poll_seconds, 1);

        config.telegram.inbound.poll_seconds = 120;
        assert_eq!(normalize_config(config.clone()).telegram.inbound.poll_seconds, 50);

        config.telegram.inbound.poll_seconds = 25;
        assert_eq!(normalize_config(config).telegram.inbound.poll_seconds, 25);
    }

    #[test]
    fn test_placeholders_disable_outbound() {
        let mut config = make_valid_config();
        config.telegram.bot_token = PLACEHOLDER_BOT_TOKEN.to_string();

        let config = normalize_config(config);
        assert!(config.telegram.bot_token.is_empty());
        assert!(!config.has_outbound());
    }

    #[test]
    fn test_chat_id_trimmed() {
        let mut config = make_valid_config();
        config.telegram.chat_id = " -100987 ".to_string();
        assert_eq!(normalize_config(config).telegram.chat_id, "-100987");
    }
}
