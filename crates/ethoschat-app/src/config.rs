use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable carrying the issuer API key
pub const API_KEY_VAR: &str = "ETHOSCHAT_API_KEY";

/// Environment variable carrying the chat endpoint URL
pub const CHAT_ENDPOINT_VAR: &str = "ETHOSCHAT_CHAT_ENDPOINT";

/// Values read from the settings file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(rename = "TOKEN_URL")]
    pub token_url: String,
}

impl Settings {
    /// Load settings from a JSON file (settings.json by default)
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }
}

/// Fully resolved endpoint and credential set, immutable after startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token_url: String,
    pub api_key: String,
    pub chat_endpoint: String,
}

impl AppConfig {
    /// Combine the settings file with the secrets supplied by the
    /// hosting environment.
    pub fn resolve(settings: Settings) -> Result<Self> {
        let api_key =
            env::var(API_KEY_VAR).with_context(|| format!("{} is not set", API_KEY_VAR))?;
        let chat_endpoint = env::var(CHAT_ENDPOINT_VAR)
            .with_context(|| format!("{} is not set", CHAT_ENDPOINT_VAR))?;

        Ok(Self {
            token_url: settings.token_url,
            api_key,
            chat_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn settings_parse_the_token_url_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"TOKEN_URL": "https://iam.example.com/identity/token"}}"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.token_url, "https://iam.example.com/identity/token");
    }

    #[test]
    fn extra_settings_keys_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"TOKEN_URL": "https://iam.example.com/identity/token", "THEME": "dark"}}"#
        )
        .unwrap();

        assert!(Settings::load(file.path()).is_ok());
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let err = Settings::load(Path::new("does-not-exist.json")).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }
}
