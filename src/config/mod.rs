//! Configuration parsing and types.

pub mod env;
pub mod holder;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

use tracing::{info, warn};

use crate::common::error::ConfigError;

pub use holder::ConfigHolder;
pub use parser::load_config;
pub use types::*;

/// Load the config file, apply env overrides, normalize and validate.
///
/// A missing file is not an error: the bridge starts with defaults (both
/// directions disabled unless the environment turns them on).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let config = if path.exists() {
        load_config(path)?
    } else {
        warn!("Config file {} not found, using defaults", path.display());
        Config::default()
    };

    let config = validate::normalize_config(env::apply_env_overrides(config));
    validate::validate_config(&config)?;
    Ok(config)
}

/// Re-read the config and publish it. The previous config stays active on
/// error.
pub fn reload(holder: &ConfigHolder, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    match load_and_validate(path) {
        Ok(config) => {
            holder.replace(config);
            info!("Configuration reloaded from {}", path.display());
            Ok(())
        }
        Err(e) => {
            warn!("Keeping previous configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn conf_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".conf").tempfile().unwrap()
    }

    #[test]
    fn test_reload_replaces_config() {
        let mut file = conf_file();
        writeln!(file, r#"telegram {{ enabled = true, bot_token = "abc", chat_id = "-100" }}"#)
            .unwrap();

        let holder = ConfigHolder::default();
        assert!(!holder.get().has_outbound());

        reload(&holder, file.path()).unwrap();
        assert_eq!(holder.get().telegram.bot_token, "abc");
        assert!(holder.get().has_outbound());
    }

    #[test]
    fn test_reload_keeps_previous_on_error() {
        let mut file = conf_file();
        writeln!(file, r#"telegram {{ bot_token = "abc", inbound {{ prefix = "a b" }} }}"#)
            .unwrap();

        let holder = ConfigHolder::default();
        assert!(reload(&holder, file.path()).is_err());
        assert_eq!(holder.get().telegram.bot_token, PLACEHOLDER_BOT_TOKEN);
    }
}
