//! Configuration management for the gallery.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Lexical database location
    pub lexicon: LexiconConfig,

    /// Category classification settings
    pub classifier: ClassifierConfig,

    /// Object storage for image files
    pub storage: StorageConfig,

    /// Label detection service
    pub vision: VisionConfig,

    /// Metadata store
    pub store: StoreConfig,

    /// Upload limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.gallery.gallery/config.toml
    /// - Linux: ~/.config/gallery/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\gallery\config\config.toml
    ///
    /// Falls back to ~/.gallery/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "gallery", "gallery")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".gallery").join("config.toml")
            })
    }

    /// Resolved lexicon directory (with ~ expansion).
    pub fn lexicon_dir(&self) -> PathBuf {
        expand_path(&self.lexicon.dir)
    }

    /// Resolved directory for the local object store.
    pub fn storage_dir(&self) -> PathBuf {
        expand_path(&self.storage.local_dir)
    }

    /// Resolved path of the metadata store file.
    pub fn store_path(&self) -> PathBuf {
        expand_path(&self.store.path)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain values pass through; empty values and unset variables give `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.classifier.threshold, 0.55);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.vision.retry_attempts, 3);
        assert_eq!(config.limits.max_file_size_mb, 20);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("[storage]"));
        assert!(toml.contains("[vision]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[classifier]\nthreshold = 0.6\n\n[storage]\nbackend = \"gcs\"\nbucket = \"photos\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.classifier.threshold, 0.6);
        assert_eq!(config.storage.backend, StorageBackend::Gcs);
        assert_eq!(config.storage.bucket, "photos");
        assert_eq!(config.vision.max_results, 10);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\nthreshold = 1.5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_tilde_paths_expanded() {
        let config = Config::default();
        assert!(config.lexicon_dir().ends_with("lexicon"));
        assert!(config.store_path().ends_with("photos.json"));

        let mut config = Config::default();
        config.store.path = "/var/lib/gallery/photos.json".to_string();
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/gallery/photos.json"));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }
}
