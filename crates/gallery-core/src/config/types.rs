//! Sub-configuration structs with their defaults.

use crate::classify::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default number of photos returned by `list`
    pub list_limit: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            list_limit: 10,
        }
    }
}

/// Lexical database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Directory containing `wordnet_nouns.txt`
    pub dir: String,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            dir: "~/.gallery/lexicon".to_string(),
        }
    }
}

/// Category classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Best category scores below this are classified as "other"
    pub threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files in a local directory, addressed by `file://` URLs
    Local,
    /// Google Cloud Storage bucket
    Gcs,
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Directory for the local backend
    pub local_dir: String,

    /// Bucket name for the GCS backend (supports ${ENV_VAR} syntax)
    pub bucket: String,

    /// OAuth access token for the GCS backend (supports ${ENV_VAR} syntax)
    pub access_token: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_dir: "~/.gallery/images".to_string(),
            bucket: "${GCS_IMAGE_BUCKET}".to_string(),
            access_token: "${GCS_ACCESS_TOKEN}".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Label detection service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// `images:annotate` endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Maximum number of labels requested per image
    pub max_results: u32,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Max retry attempts for transient failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: "${GOOGLE_VISION_API_KEY}".to_string(),
            max_results: 10,
            timeout_ms: 30000,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Metadata store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding all photo records
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "~/.gallery/photos.json".to_string(),
        }
    }
}

/// Limits applied to uploads before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Accepted file extensions
    pub supported_formats: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
