//! Metadata store kept in a single JSON document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::PhotoRecord;

use super::MetadataStore;

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreFile {
    next_id: u64,
    photos: Vec<PhotoRecord>,
}

/// JSON file store. The whole document is rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoreFile, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreFile::default())
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write to a sibling temp file, then rename over the store.
    async fn write(&self, file: &StoreFile) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(file).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn insert(&self, mut record: PhotoRecord) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;

        // Ids start at 1 and are never reused.
        let max_existing = file.photos.iter().map(|p| p.id).max().unwrap_or(0);
        let id = file.next_id.max(max_existing + 1).max(1);
        file.next_id = id + 1;

        record.id = id;
        file.photos.push(record);
        self.write(&file).await?;

        tracing::debug!("Stored photo {id}");
        Ok(id)
    }

    async fn get(&self, id: u64) -> Result<PhotoRecord, StoreError> {
        let file = self.read().await?;
        file.photos
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, record: PhotoRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;

        let slot = file
            .photos
            .iter_mut()
            .find(|p| p.id == record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        *slot = record;

        self.write(&file).await
    }

    async fn delete(&self, id: u64) -> Result<PhotoRecord, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;

        let index = file
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = file.photos.remove(index);

        self.write(&file).await?;
        Ok(removed)
    }

    async fn list(&self, limit: usize) -> Result<Vec<PhotoRecord>, StoreError> {
        let mut photos = self.read().await?.photos;
        // Records without a URL sort last.
        photos.sort_by(|a, b| b.url.cmp(&a.url));
        photos.truncate(limit);
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> PhotoRecord {
        PhotoRecord {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn temp_store() -> (JsonFileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("photos.json"));
        (store, dir)
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let (store, _dir) = temp_store();
        assert_eq!(store.insert(record("a")).await.unwrap(), 1);
        assert_eq!(store.insert(record("b")).await.unwrap(), 2);

        let got = store.get(2).await.unwrap();
        assert_eq!(got.url.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (store, _dir) = temp_store();
        store.insert(record("a")).await.unwrap();
        let id = store.insert(record("b")).await.unwrap();
        store.delete(id).await.unwrap();
        assert_eq!(store.insert(record("c")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let (store, _dir) = temp_store();
        assert!(store.list(10).await.unwrap().is_empty());
        assert!(matches!(store.get(1).await, Err(StoreError::NotFound(1))));
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let (store, _dir) = temp_store();
        let id = store.insert(record("a")).await.unwrap();

        let mut updated = store.get(id).await.unwrap();
        updated.photographer = Some("Ana".to_string());
        store.update(updated).await.unwrap();

        assert_eq!(store.get(id).await.unwrap().photographer.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (store, _dir) = temp_store();
        let missing = PhotoRecord {
            id: 42,
            ..Default::default()
        };
        assert!(matches!(store.update(missing).await, Err(StoreError::NotFound(42))));
        assert!(matches!(store.delete(42).await, Err(StoreError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_list_orders_by_url_desc_and_limits() {
        let (store, _dir) = temp_store();
        for url in ["b.jpg", "d.jpg", "a.jpg", "c.jpg"] {
            store.insert(record(url)).await.unwrap();
        }
        store.insert(PhotoRecord::default()).await.unwrap();

        let urls: Vec<Option<String>> = store
            .list(10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                Some("d.jpg".to_string()),
                Some("c.jpg".to_string()),
                Some("b.jpg".to_string()),
                Some("a.jpg".to_string()),
                None,
            ]
        );
        assert_eq!(store.list(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reads_records_with_extra_fields() {
        let (store, _dir) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"photos":[{"id":5,"url":"x.jpg","likes":3}],"schema":2}"#,
        )
        .unwrap();

        let got = store.get(5).await.unwrap();
        assert_eq!(got.url.as_deref(), Some("x.jpg"));
        // next_id missing from the file: continue after the largest id
        assert_eq!(store.insert(record("y.jpg")).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let (store, _dir) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.list(1).await, Err(StoreError::Corrupt { .. })));
    }
}
