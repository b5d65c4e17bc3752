use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_ENDPOINT;
use crate::error::ConfigError;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "GEMMA_CHAT_ENDPOINT";

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config directory. A missing file gives defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Pick the endpoint: explicit override, then `GEMMA_CHAT_ENDPOINT`,
    /// then this config, then the built-in default.
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> String {
        let from_env = std::env::var(ENDPOINT_ENV).ok();
        self.resolve_endpoint_with(cli_override, from_env.as_deref())
    }

    fn resolve_endpoint_with(&self, cli_override: Option<&str>, from_env: Option<&str>) -> String {
        [cli_override, from_env, self.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .find(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("gemma-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_load_endpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint": "http://example.test/chat"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://example.test/chat"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint": "http://a/chat", "theme": "dark"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://a/chat"));
    }

    #[test]
    fn test_endpoint_precedence() {
        let config = Config {
            endpoint: Some("http://file/chat".to_string()),
        };

        assert_eq!(
            config.resolve_endpoint_with(Some("http://cli/chat"), Some("http://env/chat")),
            "http://cli/chat"
        );
        assert_eq!(
            config.resolve_endpoint_with(None, Some("http://env/chat")),
            "http://env/chat"
        );
        assert_eq!(config.resolve_endpoint_with(None, None), "http://file/chat");
        assert_eq!(Config::new().resolve_endpoint_with(None, None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_blank_endpoint_falls_back_to_default() {
        let config = Config {
            endpoint: Some("  ".to_string()),
        };
        assert_eq!(config.resolve_endpoint_with(None, None), DEFAULT_ENDPOINT);
    }
}
