use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    connection::{ConnectionConfig, DEFAULT_LANGUAGE},
    endpoint::ApiVariant,
};

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "ACCUWEATHER_APIKEY";

/// Settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "0123456789abcdef0123456789abcdef"
/// variant = "development"
/// version = 1
/// language = "en"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub variant: ApiVariant,
    pub version: u32,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            variant: ApiVariant::default(),
            version: 1,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "accuweather-client", "accuweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `ACCUWEATHER_APIKEY` on top of the file settings.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_overrides_from(|name| std::env::var(name).ok())
    }

    /// Like [`Config::with_env_overrides`], reading variables through `lookup`.
    pub fn with_env_overrides_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.with_api_key_override(lookup(API_KEY_ENV))
    }

    /// Replace the stored key with `key` when one is given and non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        {
            self.api_key = Some(key);
        }
        self
    }

    /// Build the connection settings. An explicit key beats the environment,
    /// which beats the file.
    pub fn connection_config(&self, explicit_key: Option<String>) -> ConnectionConfig {
        self.connection_config_from(explicit_key, |name| std::env::var(name).ok())
    }

    pub fn connection_config_from(
        &self,
        explicit_key: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConnectionConfig {
        let resolved = self
            .clone()
            .with_env_overrides_from(lookup)
            .with_api_key_override(explicit_key);

        ConnectionConfig {
            api_key: resolved.api_key,
            variant: resolved.variant,
            version: resolved.version,
            language: resolved.language,
            timeout: Duration::from_secs(resolved.timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn save_and_load_through_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some(KEY.into()),
            variant: ApiVariant::Production,
            language: "hu".into(),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "variant = \"production\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.variant, ApiVariant::Production);
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.timeout_secs, 10);
    }

    #[test]
    fn garbage_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "variant = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn override_replaces_key_unless_blank() {
        let cfg = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };

        let kept = cfg.clone().with_api_key_override(Some("   ".into()));
        assert_eq!(kept.api_key.as_deref(), Some("from-file"));

        let kept = cfg.clone().with_api_key_override(None);
        assert_eq!(kept.api_key.as_deref(), Some("from-file"));

        let replaced = cfg.with_api_key_override(Some(KEY.into()));
        assert_eq!(replaced.api_key.as_deref(), Some(KEY));
    }

    fn env_with_key(name: &str) -> Option<String> {
        (name == API_KEY_ENV).then(|| "from-env".to_string())
    }

    #[test]
    fn environment_beats_file() {
        let cfg = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };

        let resolved = cfg.clone().with_env_overrides_from(env_with_key);
        assert_eq!(resolved.api_key.as_deref(), Some("from-env"));

        let conn = cfg.connection_config_from(None, env_with_key);
        assert_eq!(conn.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn unset_or_blank_environment_keeps_file_key() {
        let cfg = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };

        let resolved = cfg.clone().with_env_overrides_from(|_| None);
        assert_eq!(resolved.api_key.as_deref(), Some("from-file"));

        let resolved = cfg.with_env_overrides_from(|_| Some(" ".into()));
        assert_eq!(resolved.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn explicit_key_beats_environment_and_file() {
        let cfg = Config {
            api_key: Some("from-file".into()),
            timeout_secs: 3,
            ..Config::default()
        };

        let conn = cfg.connection_config_from(Some(KEY.into()), env_with_key);
        assert_eq!(conn.api_key.as_deref(), Some(KEY));
        assert_eq!(conn.timeout, Duration::from_secs(3));
        assert_eq!(conn.variant, ApiVariant::Development);
    }
}
