//! Configuration for the integration layer
//!
//! Provides centralized configuration for all components, loaded from an
//! optional TOML file. Every section and field falls back to its default.

use crate::llm::LLMConfig;
use crate::speech::{Language, TTSConfig};
use crate::{JugalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "jugal";

pub const CREDENTIAL_FILE_NAME: &str = "credentials.json";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// What to do with a response that arrives after the conversation it
/// belonged to was reset or the credential was removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Append it to whatever the log now holds
    #[default]
    Append,
    /// Drop it
    Discard,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub stale_responses: StaleResponsePolicy,
    /// Language selected at startup
    pub language: Language,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Credential file; defaults to the platform config dir
    pub credential_path: Option<PathBuf>,
}

/// Configuration for the complete application
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename = "responder")]
    pub llm: LLMConfig,

    #[serde(rename = "voice")]
    pub tts: TTSConfig,

    pub storage: StorageConfig,

    pub session: SessionConfig,
}

/// Platform config directory for the app, if the platform has one
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

impl AppConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            JugalError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| JugalError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| JugalError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Where the credential lives on disk
    pub fn credential_path(&self) -> Result<PathBuf> {
        match &self.storage.credential_path {
            Some(path) => Ok(path.clone()),
            None => default_config_dir()
                .map(|dir| dir.join(CREDENTIAL_FILE_NAME))
                .ok_or_else(|| {
                    JugalError::ConfigError("No config directory on this platform".to_string())
                }),
        }
    }

    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_tts(mut self, tts: TTSConfig) -> Self {
        self.tts = tts;
        self
    }

    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.credential_path = Some(path.into());
        self
    }

    pub fn with_stale_responses(mut self, policy: StaleResponsePolicy) -> Self {
        self.session.stale_responses = policy;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.session.language = language;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(JugalError::ConfigError("Model name is required".to_string()));
        }

        if !(self.llm.api_base.starts_with("http://") || self.llm.api_base.starts_with("https://"))
        {
            return Err(JugalError::ConfigError(format!(
                "API base must be an http(s) URL: {}",
                self.llm.api_base
            )));
        }

        if !(0.0..=2.0).contains(&self.tts.pitch) {
            return Err(JugalError::ConfigError(format!(
                "Voice pitch must be within 0.0..=2.0, got {}",
                self.tts.pitch
            )));
        }

        if !(0.1..=10.0).contains(&self.tts.rate) {
            return Err(JugalError::ConfigError(format!(
                "Voice rate must be within 0.1..=10.0, got {}",
                self.tts.rate
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.tts.pitch, 1.1);
        assert_eq!(config.session.stale_responses, StaleResponsePolicy::Append);
        assert_eq!(config.session.language, Language::English);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [responder]
            model = "gemini-2.0-flash"
            enable_search = false

            [voice]
            rate = 0.9

            [session]
            stale_responses = "discard"
            language = "nepali"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(!config.llm.enable_search);
        assert_eq!(config.llm.api_base, crate::llm::config::DEFAULT_API_BASE);
        assert_eq!(config.tts.rate, 0.9);
        assert_eq!(config.tts.pitch, 1.1);
        assert_eq!(config.session.stale_responses, StaleResponsePolicy::Discard);
        assert_eq!(config.session.language, Language::Nepali);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml("[voice]\npitch = 5.0").is_err());
        assert!(AppConfig::from_toml("[responder]\napi_base = \"ftp://x\"").is_err());
        assert!(AppConfig::from_toml("[responder]\nmodel = \"  \"").is_err());
        assert!(AppConfig::from_toml("not = [valid").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[storage]\ncredential_path = \"/tmp/jugal-key.json\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(
            config.credential_path().unwrap(),
            PathBuf::from("/tmp/jugal-key.json")
        );
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::default()
            .with_credential_path("/tmp/k.json")
            .with_stale_responses(StaleResponsePolicy::Discard)
            .with_language(Language::Nepali)
            .with_tts(TTSConfig::default().with_rate(1.2));

        assert_eq!(config.storage.credential_path, Some(PathBuf::from("/tmp/k.json")));
        assert_eq!(config.session.stale_responses, StaleResponsePolicy::Discard);
        assert_eq!(config.session.language, Language::Nepali);
        assert_eq!(config.tts.rate, 1.2);
    }
}
