use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::fs;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::llm::{LLMError, LLMProvider, ModelRegistry};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Falls back to the provider's own default when unset.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            api_url: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }

    /// Configured API key, or the one from the environment.
    pub fn api_key(&self) -> Option<String> {
        pick_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    /// HTTP client honoring the configured request timeout.
    pub fn http_client(&self) -> Result<Client, ConfigError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .build()?)
    }

    /// Resolve the configured model from `registry`.
    ///
    /// A missing key is passed through as empty so that the constructor
    /// reports it.
    pub fn resolve(&self, registry: &ModelRegistry) -> Result<Box<dyn LLMProvider>, LLMError> {
        let api_key = self.api_key().unwrap_or_default();
        registry.resolve_with_url(&self.model, &api_key, self.api_url.as_deref())
    }
}

/// Empty values count as unset on both sides.
fn pick_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| from_env.filter(|k| !k.is_empty()))
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.api_key.is_none());
        assert!(config.api_url.is_none());
        assert_eq!(config.request_timeout_seconds, 60);
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(&missing_path).await.unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout_seconds, 60);
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model: "gpt-4o"
api_key: "sk-from-file"
api_url: "http://localhost:11434/v1"
request_timeout_seconds: 15
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key.as_deref(), Some("sk-from-file"));
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.request_timeout_seconds, 15);
        assert_eq!(config.api_key(), Some("sk-from-file".to_string()));
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "model: gpt-4").unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.model, "gpt-4");
        assert!(config.api_url.is_none()); // default
        assert_eq!(config.request_timeout_seconds, 60); // default
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path()).await;
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_api_key_prefers_configured_value() {
        let key = pick_api_key(Some("sk-file"), Some("sk-env".to_string()));
        assert_eq!(key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_api_key_falls_back_to_env() {
        let key = pick_api_key(None, Some("sk-env".to_string()));
        assert_eq!(key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_empty_configured_api_key_falls_back_to_env() {
        let key = pick_api_key(Some(""), Some("sk-env".to_string()));
        assert_eq!(key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_api_key_unset_everywhere() {
        assert!(pick_api_key(None, None).is_none());
        assert!(pick_api_key(Some(""), Some(String::new())).is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("sk-very-secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("gpt-4o-mini"));
    }

    #[test]
    fn test_http_client_builds() {
        let config = Config {
            request_timeout_seconds: 5,
            ..Config::default()
        };
        assert!(config.http_client().is_ok());
    }

    #[test]
    fn test_resolve_configured_model() {
        let registry = ModelRegistry::with_builtin_models();
        let config = Config {
            model: "gpt-4".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };

        let provider = config.resolve(&registry).unwrap();
        assert_eq!(provider.model(), "gpt-4");
    }

    #[test]
    fn test_resolve_unknown_model() {
        let registry = ModelRegistry::with_builtin_models();
        let config = Config {
            model: "mystery".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };

        assert!(matches!(
            config.resolve(&registry),
            Err(LLMError::UnregisteredModel(_))
        ));
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }
}
