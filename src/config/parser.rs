//! Loading of the TOML configuration file

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
///
/// Used by `load_config`; also handy when the TOML does not live in a file.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration file at `path`
///
/// # Errors
///
/// `ConfigError::Io` when the file cannot be read, `ConfigError::Parse` for
/// bad TOML, and `ConfigError::Validation`/`InvalidUrl` when a value is
/// out of range.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemap_resolver::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Seeds: {}", config.seeds.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex SHA-256 of the configuration file at `path`
///
/// Logged at startup so two runs can be told apart by their settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads the configuration and hashes the very text that was parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
