//! Persistence of photo records.

mod json_file;

pub use json_file::JsonFileStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::PhotoRecord;

/// Key-value store of [`PhotoRecord`]s.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Store a new record, ignoring its `id`. Returns the assigned id.
    async fn insert(&self, record: PhotoRecord) -> Result<u64, StoreError>;

    async fn get(&self, id: u64) -> Result<PhotoRecord, StoreError>;

    /// Replace the record with the same `id`.
    async fn update(&self, record: PhotoRecord) -> Result<(), StoreError>;

    /// Remove a record, returning what was stored.
    async fn delete(&self, id: u64) -> Result<PhotoRecord, StoreError>;

    /// Up to `limit` records ordered by URL descending.
    async fn list(&self, limit: usize) -> Result<Vec<PhotoRecord>, StoreError>;
}
