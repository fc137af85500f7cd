//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ServiceError;

use super::ObjectStore;

const SERVICE: &str = "local storage";

/// Stores objects as files in one directory and addresses them by `file://` URL.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Object names are flattened to their final path component.
    fn object_path(&self, object_name: &str) -> Result<PathBuf, ServiceError> {
        Path::new(object_name)
            .file_name()
            .map(|name| self.root.join(name))
            .ok_or_else(|| ServiceError::Request {
                service: SERVICE,
                message: format!("Invalid object name {object_name:?}"),
                status_code: None,
            })
    }

    fn io_error(path: &Path, e: std::io::Error) -> ServiceError {
        ServiceError::Request {
            service: SERVICE,
            message: format!("{}: {e}", path.display()),
            status_code: None,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put(
        &self,
        object_name: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, ServiceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::io_error(&self.root, e))?;

        let path = self.object_path(object_name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Self::io_error(&path, e))?;

        let absolute = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        Ok(format!("file://{}", absolute.display()))
    }

    async fn delete(&self, object_name: &str) -> Result<(), ServiceError> {
        let path = self.object_path(object_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn object_name(&self, url: &str) -> Option<String> {
        let path = Path::new(url.strip_prefix("file://")?);
        path.file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
    }
}
