use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Console configuration, loaded from YAML. CLI flags override individual
/// fields after loading.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the review API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout for collaborator calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional bearer token for the review API.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Seconds a toast stays on screen before expiring.
    #[serde(default = "default_notice_ttl_secs")]
    pub notice_ttl_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            notice_ttl_secs: default_notice_ttl_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_notice_ttl_secs() -> u64 {
    6
}

impl ConsoleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit path, the default path when it exists, or built-in
    /// defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            anyhow::bail!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            );
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Default config location: `~/.querydesk/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".querydesk").join("config.yaml"))
}

/// Session log location: `~/.querydesk/sessions/<session_id>/`.
pub fn session_logs_dir(session_id: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".querydesk").join("sessions").join(session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_validate() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_load_partial_yaml_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  base_url: https://queries.example.com/api\n  api_key: secret"
        )
        .unwrap();

        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://queries.example.com/api");
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.notice_ttl_secs, 6);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  base_url: ftp://example.com").unwrap();

        let result = ConsoleConfig::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  timeout_secs: 0").unwrap();

        let result = ConsoleConfig::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = ConsoleConfig::load(Path::new("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
