//! Core data types for gallery records and uploads.

use serde::{Deserialize, Serialize};

/// A stored photo and its metadata.
///
/// Every field but `id` is optional: records written by older versions, or
/// edited by hand, may lack any of them. Unknown fields are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRecord {
    /// Store-assigned identifier
    pub id: u64,

    /// Public URL of the stored image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Free-text date as entered by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Detected labels joined into one description string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Category string ("animal", "flower", "people", "other", or a user value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// User-supplied descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoMetadata {
    pub photographer: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}

/// Partial update of a record. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoEdit {
    pub photographer: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    /// Used verbatim when no replacement image is supplied
    pub category: Option<String>,
}

impl PhotoEdit {
    /// Apply the free-text fields (not the category) to `record`.
    pub fn apply_metadata(&self, record: &mut PhotoRecord) {
        if let Some(photographer) = &self.photographer {
            record.photographer = Some(photographer.clone());
        }
        if let Some(location) = &self.location {
            record.location = Some(location.clone());
        }
        if let Some(date) = &self.date {
            record.date = Some(date.clone());
        }
    }
}

/// An image file submitted for storage.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name, used as the object name
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Join detected labels into the stored description string.
pub fn describe_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
