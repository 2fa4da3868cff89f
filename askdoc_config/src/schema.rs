use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub reveal: RevealSettings,
    /// Websearch default for sessions without a stored preference.
    #[serde(default)]
    pub websearch_default: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "BackendConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "BackendConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    fn default_base_url() -> String {
        "http://localhost:8000".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

/// Timing of the simulated streaming reveal.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RevealSettings {
    /// Milliseconds between characters of a live answer.
    #[serde(default = "RevealSettings::default_answer_tick_ms")]
    pub answer_tick_ms: u64,
    /// Milliseconds between characters of the welcome banner.
    #[serde(default = "RevealSettings::default_banner_tick_ms")]
    pub banner_tick_ms: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            answer_tick_ms: Self::default_answer_tick_ms(),
            banner_tick_ms: Self::default_banner_tick_ms(),
        }
    }
}

impl RevealSettings {
    const fn default_answer_tick_ms() -> u64 {
        30
    }

    const fn default_banner_tick_ms() -> u64 {
        70
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'askdoc init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Load the config, falling back to defaults when the file is absent.
    #[must_use]
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::debug!("using default config: {e}");
            Self::default()
        })
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("askdoc"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "backend": {
    "base_url": "http://localhost:8000",
    "timeout_secs": 30
  },
  "reveal": {
    "answer_tick_ms": 30,
    "banner_tick_ms": 70
  },
  "websearch_default": false
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Point backend.base_url at your answering service");
        println!("   2. Run 'askdoc chat' to start a conversation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = serde_json::from_str("{}").unwrap_or_default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.reveal.answer_tick_ms, 30);
        assert!(!config.websearch_default);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "backend": { "base_url": "http://qa:9000" } }"#)
                .unwrap_or_default();
        assert_eq!(config.backend.base_url, "http://qa:9000");
        assert_eq!(config.backend.timeout_secs, 30);
    }
}
