//! Object storage for uploaded image files.

mod gcs;
mod local;

pub use gcs::GcsObjectStore;
pub use local::LocalObjectStore;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::error::ServiceError;

/// Stores image bytes and serves them at a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store name for logging.
    fn name(&self) -> &str;

    /// Store `bytes` under `object_name`, replacing any existing object.
    /// Returns the object's public URL.
    async fn put(
        &self,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ServiceError>;

    /// Remove the named object. Missing objects are not an error.
    async fn delete(&self, object_name: &str) -> Result<(), ServiceError>;

    /// Recover the object name from a public URL issued by this store.
    fn object_name(&self, url: &str) -> Option<String>;
}

/// Create the configured object store.
pub fn from_config(config: &Config) -> Result<Arc<dyn ObjectStore>, ServiceError> {
    match config.storage.backend {
        StorageBackend::Local => Ok(Arc::new(LocalObjectStore::new(config.storage_dir()))),
        StorageBackend::Gcs => Ok(Arc::new(GcsObjectStore::from_config(&config.storage)?)),
    }
}

/// MIME type for an image file name, by extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("dog.jpg"), "image/jpeg");
        assert_eq!(content_type_for("DOG.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("rose.png"), "image/png");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_from_config_local() {
        let config = Config::default();
        let store = from_config(&config).unwrap();
        assert_eq!(store.name(), "local");
    }
}
