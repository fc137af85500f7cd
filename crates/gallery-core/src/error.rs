//! Error types for the gallery.
//!
//! Errors are grouped by the collaborator that produced them so messages carry
//! the relevant context (paths, ids, HTTP status).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for gallery operations.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lexical database errors
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    /// Remote service errors (vision, object storage)
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Metadata store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Rejected uploads
    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors loading the lexical database.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Lexicon file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read lexicon {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to a remote service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request failed, or the service answered with an error status
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
        /// HTTP status code, if the failure came from an HTTP response
        status_code: Option<u16>,
    },

    /// Request did not complete in time
    #[error("{service} request timed out after {timeout_ms}ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u64,
    },

    /// Response could not be understood
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

/// Metadata store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No photo with id {0}")]
    NotFound(u64),

    #[error("Failed to access store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons an upload is refused before anything is stored.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file uploaded")]
    Empty,

    #[error("Unsupported file type for {file_name}")]
    UnsupportedFormat { file_name: String },

    #[error("File too large: {file_name} ({size_mb}MB > {max_mb}MB)")]
    TooLarge {
        file_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    #[error("{file_name} is not a recognized image (invalid magic bytes)")]
    NotAnImage { file_name: String },
}

/// Convenience type alias for gallery results.
pub type Result<T> = std::result::Result<T, GalleryError>;
