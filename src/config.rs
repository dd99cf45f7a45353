//! Configuration Management
//!
//! Provider credentials and transport settings, persisted under the user's
//! config directory and overridable from the command line or environment.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frontegg::{ClientConfig, ClientSettings, DEFAULT_API_URL, DEFAULT_PORTAL_URL};

pub const ENV_CLIENT_ID: &str = "FRONTEGG_CLIENT_ID";
pub const ENV_SECRET_KEY: &str = "FRONTEGG_SECRET_KEY";
pub const ENV_API_URL: &str = "FRONTEGG_API_URL";
pub const ENV_PORTAL_URL: &str = "FRONTEGG_PORTAL_URL";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Base URL of the authentication API
    #[serde(default)]
    pub api_url: Option<String>,
    /// Base URL of the portal API that hosts webhooks
    #[serde(default)]
    pub portal_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("frontegg-provider").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit JSON or YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Fill every unset field from `fallback`
    pub fn merged_with(self, fallback: Config) -> Self {
        Self {
            client_id: self.client_id.or(fallback.client_id),
            secret_key: self.secret_key.or(fallback.secret_key),
            api_url: self.api_url.or(fallback.api_url),
            portal_url: self.portal_url.or(fallback.portal_url),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            max_retries: self.max_retries.or(fallback.max_retries),
        }
    }

    pub fn effective_api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn effective_portal_url(&self) -> String {
        self.portal_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string())
    }

    pub fn client_settings(&self) -> ClientSettings {
        let mut settings = ClientSettings::default();
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.max_retries {
            settings.max_retries = retries;
        }
        settings
    }

    /// Build the client configuration; credentials are mandatory here
    pub fn client_config(&self) -> Result<ClientConfig> {
        let client_id = self
            .client_id
            .clone()
            .filter(|s| !s.is_empty())
            .with_context(|| format!("No client ID configured. Set {} or use --client-id", ENV_CLIENT_ID))?;
        let secret_key = self
            .secret_key
            .clone()
            .filter(|s| !s.is_empty())
            .with_context(|| {
                format!("No secret key configured. Set {} or use --secret-key", ENV_SECRET_KEY)
            })?;

        Ok(ClientConfig {
            client_id,
            secret_key,
            api_url: self.effective_api_url(),
            portal_url: self.effective_portal_url(),
            settings: self.client_settings(),
        })
    }
}

/// Read a JSON or YAML document; YAML is picked by `.yaml`/`.yml` extension
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    if is_yaml(path) {
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML {:?}", path))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON {:?}", path))
    }
}

/// Write a document in the format implied by its extension
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_explicit_values() {
        let cli = Config {
            client_id: Some("cli".to_string()),
            ..Default::default()
        };
        let file = Config {
            client_id: Some("file".to_string()),
            secret_key: Some("key".to_string()),
            ..Default::default()
        };
        let merged = cli.merged_with(file);
        assert_eq!(merged.client_id.as_deref(), Some("cli"));
        assert_eq!(merged.secret_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.effective_api_url(), DEFAULT_API_URL);
        assert_eq!(config.effective_portal_url(), DEFAULT_PORTAL_URL);
        assert_eq!(config.client_settings().max_retries, 2);
    }

    #[test]
    fn test_client_settings_overrides() {
        let config = Config {
            timeout_secs: Some(5),
            max_retries: Some(0),
            ..Default::default()
        };
        let settings = config.client_settings();
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.max_retries, 0);
    }

    #[test]
    fn test_client_config_requires_credentials() {
        let err = Config::default().client_config().unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));

        let config = Config {
            client_id: Some("id".to_string()),
            secret_key: Some("key".to_string()),
            ..Default::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(client.client_id, "id");
        assert_eq!(client.portal_url, DEFAULT_PORTAL_URL);
    }

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("webhook.yaml")));
        assert!(is_yaml(Path::new("webhook.yml")));
        assert!(!is_yaml(Path::new("webhook.json")));
    }

    #[test]
    fn test_documents_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("frontegg-provider-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = Config {
            client_id: Some("id".to_string()),
            max_retries: Some(3),
            ..Default::default()
        };

        for name in ["config.json", "config.yaml"] {
            let path = dir.join(name);
            write_document(&path, &config).unwrap();
            let back: Config = read_document(&path).unwrap();
            assert_eq!(back, config);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
