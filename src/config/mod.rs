//! Application configuration.
//!
//! Every field has a default, so a partial TOML file (or none at all) is
//! enough to start. Values are checked by `AppConfig::validate` after
//! loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::radar::RadarGeometry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// `[ai]`: which language model answers assistant questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// "ollama" or "anthropic"
    pub backend: String,
    pub base_url: String,
    pub model: String,
    /// Environment variable read for the remote API key. The key itself is
    /// never stored in the config file.
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// Reply length cap; the backend's own default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_seconds: 60,
            max_retries: 2,
            max_tokens: None,
        }
    }
}

impl AiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(invalid("ai.timeout_seconds must be greater than 0"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("ai.base_url '{}': {}", self.base_url, e)))?;
        if self.max_tokens == Some(0) {
            return Err(invalid("ai.max_tokens must be greater than 0"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(invalid("ai.api_key_env must name an environment variable"));
        }
        Ok(())
    }
}

/// `[server]`: HTTP listener for `serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origin: "*".to_string(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }
        Ok(())
    }
}

/// `[radar]`: chart dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub size: f64,
    /// Plot radius as a fraction of `size`
    pub radius_ratio: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            size: 180.0,
            radius_ratio: 0.35,
        }
    }
}

impl RadarConfig {
    pub fn geometry(&self) -> RadarGeometry {
        RadarGeometry::new(self.size, self.radius_ratio)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.size.is_nan() || self.size <= 0.0 {
            return Err(invalid("radar.size must be greater than 0"));
        }
        if !(self.radius_ratio > 0.0 && self.radius_ratio <= 0.5) {
            return Err(invalid(format!(
                "radar.radius_ratio must be in (0, 0.5], got {}",
                self.radius_ratio
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    /// External catalog file; the built-in dataset is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub ai: AiConfig,
    pub server: ServerConfig,
    pub radar: RadarConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            catalog_path: None,
            ai: AiConfig::default(),
            server: ServerConfig::default(),
            radar: RadarConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `from_file`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        info!("Reading configuration from {}", path.display());
        Self::from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ai.validate()?;
        self.server.validate()?;
        self.radar.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert!(config.catalog_path.is_none());
        assert_eq!(config.ai.backend, "ollama");
        assert_eq!(config.ai.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.ai.timeout_seconds, 60);
        assert_eq!(config.ai.max_retries, 2);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_radar_matches_geometry() {
        let g = RadarConfig::default().geometry();
        assert_eq!(g, RadarGeometry::default());
    }

    #[test]
    fn test_custom_radar_geometry() {
        let radar = RadarConfig {
            size: 200.0,
            radius_ratio: 0.4,
        };
        let g = radar.geometry();
        assert_eq!(g.center, 100.0);
        assert_eq!(g.radius, 80.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases: [(&str, fn(&mut AppConfig)); 9] = [
            ("zero timeout", |c| c.ai.timeout_seconds = 0),
            ("zero max tokens", |c| c.ai.max_tokens = Some(0)),
            ("bad url", |c| c.ai.base_url = "not a url".to_string()),
            ("blank key env", |c| c.ai.api_key_env = " ".to_string()),
            ("zero port", |c| c.server.port = 0),
            ("zero radar size", |c| c.radar.size = 0.0),
            ("nan radar size", |c| c.radar.size = f64::NAN),
            ("ratio too large", |c| c.radar.radius_ratio = 0.6),
            ("zero ratio", |c| c.radar.radius_ratio = 0.0),
        ];

        for (name, mutate) in cases {
            let mut config = AppConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(ConfigError::ValidationError(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
log_level = "debug"
catalog_path = "players.json"

[ai]
max_tokens = 512

[server]
port = 9000
"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.catalog_path, Some(PathBuf::from("players.json")));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ai.model, "llama3.2");
        assert_eq!(config.ai.max_tokens, Some(512));
        assert_eq!(config.radar.size, 180.0);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let file = write_config("[ai]\ntimeout_seconds = 0\n");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));

        let file = write_config("[server\nport = ");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_toml_roundtrip_keeps_key_env() {
        let mut config = AppConfig::default();
        config.ai.api_key_env = "PINGPONG_KEY".to_string();

        let parsed: AppConfig = toml::from_str(&toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(parsed.ai.api_key_env, "PINGPONG_KEY");
    }
}
