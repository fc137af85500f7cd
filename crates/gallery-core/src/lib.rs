//! Gallery Core - photo ingestion and label classification.
//!
//! Photos are stored in an object store, labelled by a remote vision
//! service, and assigned one of four categories by comparing the first
//! single-word label against reference words in a WordNet lexicon.
//!
//! # Architecture
//!
//! ```text
//! Upload → Validate → Object store → Label detection → Classify → Metadata store
//! ```
//!
//! Every remote collaborator sits behind a trait ([`ObjectStore`],
//! [`LabelDetector`], [`MetadataStore`]) and is injected into [`Gallery`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use gallery_core::{Config, Gallery, PhotoMetadata, Upload};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let gallery = Gallery::from_config(&config)?;
//!
//!     let bytes = tokio::fs::read("dog.jpg").await?;
//!     let record = gallery
//!         .upload(Upload::new("dog.jpg", bytes), PhotoMetadata::default())
//!         .await?;
//!     println!("Category: {:?}", record.category);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod gallery;
pub mod lexicon;
pub mod output;
pub mod retry;
pub mod storage;
pub mod store;
pub mod types;
pub mod validate;
pub mod vision;

pub use classify::{Category, CategoryGroups, Classification, LabelClassifier};
pub use config::Config;
pub use error::{
    ConfigError, GalleryError, LexiconError, Result, ServiceError, StoreError, UploadError,
};
pub use gallery::Gallery;
pub use lexicon::{LexicalOracle, Lexicon, Synset};
pub use output::{OutputFormat, OutputWriter};
pub use storage::ObjectStore;
pub use store::MetadataStore;
pub use types::{PhotoEdit, PhotoMetadata, PhotoRecord, Upload};
pub use vision::LabelDetector;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
