use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_SERVICE_URL;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            theme: default_theme(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // First run: write the defaults so there is a file to edit.
            let config = Config::default();
            let _ = config.save();
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repocards")
            .join("config.toml")
    }

    /// Clamp values a hand-edited config file could break.
    pub fn normalize(&mut self) {
        if self.service_url.trim().is_empty() {
            self.service_url = default_service_url();
        }
        self.service_url = self.service_url.trim_end_matches('/').to_string();
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: Config =
            toml::from_str(r#"service_url = "http://analysis.local:9000""#).unwrap();
        assert_eq!(config.service_url, "http://analysis.local:9000");
        assert_eq!(config.theme, "terminal-default");
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let config = Config {
            theme: "catppuccin-mocha".to_string(),
            ..Config::default()
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.theme, "catppuccin-mocha");
        assert_eq!(deserialized.service_url, config.service_url);
    }

    #[test]
    fn normalize_repairs_broken_values() {
        let mut config = Config {
            service_url: "   ".to_string(),
            theme: "terminal-default".to_string(),
            request_timeout_secs: 0,
        };
        config.normalize();
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.request_timeout_secs, 1);

        let mut config = Config {
            service_url: "http://host:8001/".to_string(),
            theme: "terminal-default".to_string(),
            request_timeout_secs: 999,
        };
        config.normalize();
        assert_eq!(config.service_url, "http://host:8001");
        assert_eq!(config.request_timeout_secs, 120);
    }
}
