//! Config file parsing.
//!
//! The file is HOCON, so comments, unquoted keys and `a.b = c` paths all
//! work. Keys the bridge does not know are ignored; keys it knows but that
//! are absent take their defaults.

use std::fs;
use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Read and parse the config file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    load_config_str(&content)
}

/// Parse config text. A blank document yields the defaults.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    HoconLoader::new()
        .load_str(content)
        .map_err(parse_error)?
        .resolve()
        .map_err(parse_error)
}

fn parse_error(e: hocon::Error) -> ConfigError {
    ConfigError::ParseError {
        message: e.to_string(),
    }
}
