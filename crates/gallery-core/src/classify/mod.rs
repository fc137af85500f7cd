//! Label → category classification.
//!
//! Picks the first single-word label reported for an image and assigns it to
//! the closest of a fixed set of categories by WordNet similarity, falling
//! back to `other` below a threshold.

pub mod category;
pub mod classifier;

pub use category::{Category, CategoryGroups};
pub use classifier::{CategoryScore, Classification, LabelClassifier, DEFAULT_THRESHOLD};
