use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::storage::PersistencePolicy;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MindstreamConfig {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub enhance: EnhanceConfig,
    pub images: ImageConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub persistence: PersistencePolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// The one name that is granted the author role.
    pub admin_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnhanceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for MindstreamConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            enhance: EnhanceConfig::default(),
            images: ImageConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_mindstream_dir()
            .join("mindstream.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            persistence: PersistencePolicy::WriteThrough,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_name: "Leslie Lyu".into(),
        }
    }
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 70,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Returns `~/.mindstream/`, or `./.mindstream/` when no home directory is known.
pub fn default_mindstream_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mindstream")
}

/// Returns the default config file path: `~/.mindstream/config.toml`
pub fn default_config_path() -> PathBuf {
    default_mindstream_dir().join("config.toml")
}

impl MindstreamConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MindstreamConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `MINDSTREAM_DB`, `MINDSTREAM_LOG_LEVEL` and `MINDSTREAM_ADMIN` map onto
    /// their config keys. The AI credential is read from `GEMINI_API_KEY`,
    /// falling back to `API_KEY`; an empty value counts as unset.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MINDSTREAM_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MINDSTREAM_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Ok(val) = std::env::var("MINDSTREAM_ADMIN") {
            self.auth.admin_name = val;
        }
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if key.is_some() {
            self.enhance.api_key = key;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

impl EnhanceConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MindstreamConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.auth.admin_name, "Leslie Lyu");
        assert_eq!(config.storage.persistence, PersistencePolicy::WriteThrough);
        assert_eq!(config.images.max_dimension, 1024);
        assert_eq!(config.images.jpeg_quality, 70);
        assert!(config.enhance.api_key.is_none());
        assert!(config.storage.db_path.ends_with("mindstream.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[general]
log_level = "debug"

[storage]
db_path = "/tmp/journal.db"
persistence = "write_behind"

[enhance]
model = "gemini-2.0-flash"
"#;
        let config: MindstreamConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/journal.db");
        assert_eq!(config.storage.persistence, PersistencePolicy::WriteBehind);
        assert_eq!(config.enhance.model, "gemini-2.0-flash");
        // defaults still apply for unset fields
        assert!(config.enhance.base_url.starts_with("https://"));
        assert_eq!(config.auth.admin_name, "Leslie Lyu");
        assert!(config.display.color);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = MindstreamConfig::load_from("/nonexistent/mindstream/config.toml").unwrap();
        assert_eq!(config.images.max_dimension, 1024);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = MindstreamConfig::default();
        std::env::set_var("MINDSTREAM_DB", "/tmp/override.db");
        std::env::set_var("MINDSTREAM_LOG_LEVEL", "trace");
        std::env::set_var("MINDSTREAM_ADMIN", "Ada");
        std::env::set_var("GEMINI_API_KEY", "secret");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.general.log_level, "trace");
        assert_eq!(config.auth.admin_name, "Ada");
        assert_eq!(config.enhance.api_key.as_deref(), Some("secret"));

        // Clean up
        std::env::remove_var("MINDSTREAM_DB");
        std::env::remove_var("MINDSTREAM_LOG_LEVEL");
        std::env::remove_var("MINDSTREAM_ADMIN");
        std::env::remove_var("GEMINI_API_KEY");
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let mut enhance = EnhanceConfig::default();
        assert!(enhance.api_key().is_none());

        enhance.api_key = Some("   ".into());
        assert!(enhance.api_key().is_none());

        let config: MindstreamConfig = toml::from_str("[enhance]\napi_key = \"\"\n").unwrap();
        assert!(config.enhance.api_key().is_none());

        enhance.api_key = Some("secret".into());
        assert_eq!(enhance.api_key(), Some("secret"));
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/db.sqlite"), PathBuf::from("/var/db.sqlite"));
    }
}
