//! The closed set of photo categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::PhotoRecord;

/// Category assigned to a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Animal,
    Flower,
    People,
    Other,
}

impl Category {
    /// Categories that are scored against a candidate label, in tie-break order.
    pub const SCORED: [Category; 3] = [Category::Animal, Category::Flower, Category::People];

    /// The stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Animal => "animal",
            Category::Flower => "flower",
            Category::People => "people",
            Category::Other => "other",
        }
    }

    /// Word whose primary sense represents this category. `Other` has none.
    pub fn reference_word(self) -> Option<&'static str> {
        match self {
            Category::Other => None,
            scored => Some(scored.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact match on the stored form; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animal" => Ok(Category::Animal),
            "flower" => Ok(Category::Flower),
            "people" => Ok(Category::People),
            "other" => Ok(Category::Other),
            unknown => Err(format!("Unknown category: {unknown}")),
        }
    }
}

/// Photos partitioned into the four category buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryGroups {
    pub animal: Vec<PhotoRecord>,
    pub flower: Vec<PhotoRecord>,
    pub people: Vec<PhotoRecord>,
    pub other: Vec<PhotoRecord>,
}

impl CategoryGroups {
    /// Partition records by exact match on their category field.
    ///
    /// Records whose category is missing or not one of the four stored
    /// strings land in no bucket.
    pub fn partition(records: Vec<PhotoRecord>) -> Self {
        let mut groups = Self::default();
        for record in records {
            let category = record.category.as_deref().map(Category::from_str);
            match category {
                Some(Ok(Category::Animal)) => groups.animal.push(record),
                Some(Ok(Category::Flower)) => groups.flower.push(record),
                Some(Ok(Category::People)) => groups.people.push(record),
                Some(Ok(Category::Other)) => groups.other.push(record),
                _ => tracing::debug!(
                    "Photo {} has ungrouped category {:?}",
                    record.id,
                    record.category
                ),
            }
        }
        groups
    }

    pub fn get(&self, category: Category) -> &[PhotoRecord] {
        match category {
            Category::Animal => &self.animal,
            Category::Flower => &self.flower,
            Category::People => &self.people,
            Category::Other => &self.other,
        }
    }

    /// Total number of grouped records.
    pub fn len(&self) -> usize {
        self.animal.len() + self.flower.len() + self.people.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
