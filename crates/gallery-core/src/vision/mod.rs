//! Label detection for stored images.
//!
//! The pipeline only sees [`LabelDetector`]; [`CloudVisionDetector`] is the
//! REST implementation used in production.

mod cloud;

pub use cloud::CloudVisionDetector;

use async_trait::async_trait;

use crate::error::ServiceError;

/// Produces descriptive labels for an image addressed by URI.
///
/// Uses `async_trait` because the pipeline holds detectors as
/// `Arc<dyn LabelDetector>`.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detector name for logging.
    fn name(&self) -> &str;

    /// Labels for the image at `image_uri`, most confident first.
    async fn detect_labels(&self, image_uri: &str) -> Result<Vec<String>, ServiceError>;
}
