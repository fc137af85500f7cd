//! Classification of detected labels into a [`Category`].

use std::sync::Arc;

use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::lexicon::LexicalOracle;

use super::category::Category;

/// Best scores below this fall back to [`Category::Other`].
pub const DEFAULT_THRESHOLD: f32 = 0.55;

/// Similarity of the candidate label to one category's reference sense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    /// `None` when the two senses share no ancestor
    pub score: Option<f32>,
}

/// Outcome of classifying one label set, with the intermediate values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// First single-word label, if any
    pub candidate: Option<String>,
    /// Per-category scores, in [`Category::SCORED`] order
    pub scores: Vec<CategoryScore>,
    pub category: Category,
}

impl Classification {
    fn other(candidate: Option<String>, scores: Vec<CategoryScore>) -> Self {
        Self {
            candidate,
            scores,
            category: Category::Other,
        }
    }
}

/// Assigns label sets to categories using a shared lexical oracle.
pub struct LabelClassifier<O: LexicalOracle> {
    oracle: Arc<O>,
    threshold: f32,
}

impl<O: LexicalOracle> Clone for LabelClassifier<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            threshold: self.threshold,
        }
    }
}

impl<O: LexicalOracle> LabelClassifier<O> {
    /// Create a classifier with the configured threshold.
    pub fn new(oracle: Arc<O>, config: &ClassifierConfig) -> Self {
        Self::with_threshold(oracle, config.threshold)
    }

    pub fn with_threshold(oracle: Arc<O>, threshold: f32) -> Self {
        Self { oracle, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Classify labels given in detection confidence order.
    ///
    /// Total: any input, including an empty one, yields a category.
    pub fn classify<I, S>(&self, labels: I) -> Category
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.explain(labels).category
    }

    /// Classify and return the candidate label and per-category scores.
    pub fn explain<I, S>(&self, labels: I) -> Classification
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(candidate) = first_single_word(labels) else {
            tracing::debug!("No single-word label to classify");
            return Classification::other(None, vec![]);
        };

        let Some(sense) = self.oracle.primary_sense(&candidate) else {
            tracing::debug!("No sense for label {candidate:?}");
            return Classification::other(Some(candidate), vec![]);
        };

        let mut scores = Vec::with_capacity(Category::SCORED.len());
        for category in Category::SCORED {
            let word = category.reference_word().unwrap_or(category.as_str());
            let Some(reference) = self.oracle.primary_sense(word) else {
                tracing::warn!("Reference word {word:?} missing from lexicon");
                return Classification::other(Some(candidate), scores);
            };
            scores.push(CategoryScore {
                category,
                score: self.oracle.similarity(sense, reference),
            });
        }

        // Strictly greater keeps the first category on ties.
        let mut best = (Category::Other, f32::NEG_INFINITY);
        for s in &scores {
            let score = s.score.unwrap_or(0.0);
            if score > best.1 {
                best = (s.category, score);
            }
        }
        let (winner, best_score) = best;

        let category = if best_score < self.threshold {
            Category::Other
        } else {
            winner
        };

        tracing::debug!(
            "Label {candidate:?} ({}) -> {category} (best {winner} = {best_score:.3})",
            sense.id
        );

        Classification {
            candidate: Some(candidate),
            scores,
            category,
        }
    }
}

/// First label that is a single non-empty token.
fn first_single_word<I, S>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels.into_iter().find_map(|label| {
        let label = label.as_ref().trim();
        if label.is_empty() || label.contains(char::is_whitespace) {
            None
        } else {
            Some(label.to_string())
        }
    })
}
