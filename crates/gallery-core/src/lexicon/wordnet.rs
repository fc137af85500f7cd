//! WordNet noun database loaded from a tab-separated export.
//!
//! Each line is `lemma<TAB>synset_id<TAB>hypernym|hypernym|...`. A lemma with
//! several senses appears on several lines, most common sense first.

use std::collections::HashMap;
use std::path::Path;

use crate::error::LexiconError;

use super::oracle::{wu_palmer, LexicalOracle, Synset};

/// File name of the noun export inside the lexicon directory.
pub const NOUNS_FILE: &str = "wordnet_nouns.txt";

/// Noun extract shipped with the crate, covering common photo labels.
pub const BUNDLED_NOUNS: &str = include_str!("../../data/wordnet_nouns.txt");

/// In-memory WordNet noun senses keyed by normalized lemma.
pub struct Lexicon {
    by_word: HashMap<String, Vec<Synset>>,
    sense_count: usize,
}

impl Lexicon {
    /// Load the lexicon from `<lexicon_dir>/wordnet_nouns.txt`.
    pub fn load(lexicon_dir: &Path) -> Result<Self, LexiconError> {
        let path = lexicon_dir.join(NOUNS_FILE);
        if !path.exists() {
            return Err(LexiconError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LexiconError::Read {
            path: path.clone(),
            source,
        })?;
        let lexicon = Self::parse(&content);

        tracing::info!(
            "Loaded lexicon: {} words, {} senses from {:?}",
            lexicon.len(),
            lexicon.sense_count,
            path,
        );

        Ok(lexicon)
    }

    /// Parse the tab-separated export. Lines missing the lemma or synset id
    /// are skipped.
    pub fn parse(content: &str) -> Self {
        let mut by_word: HashMap<String, Vec<Synset>> = HashMap::new();
        let mut sense_count = 0;

        for (line_no, line) in content.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
            if parts.len() < 2 || parts[0].trim().is_empty() || parts[1].trim().is_empty() {
                tracing::warn!("Skipping malformed lexicon line {}: {:?}", line_no + 1, line);
                continue;
            }

            let lemma = parts[0].replace('_', " ");
            let hypernyms: Vec<String> = parts
                .get(2)
                .map(|chain| {
                    chain
                        .split('|')
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(|h| h.replace('_', " "))
                        .collect()
                })
                .unwrap_or_default();

            by_word
                .entry(normalize(parts[0]))
                .or_default()
                .push(Synset::new(parts[1].trim(), lemma, hypernyms));
            sense_count += 1;
        }

        Self {
            by_word,
            sense_count,
        }
    }

    /// Number of distinct lemmas.
    pub fn len(&self) -> usize {
        self.by_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_word.is_empty()
    }

    /// Total number of senses across all lemmas.
    pub fn sense_count(&self) -> usize {
        self.sense_count
    }
}

impl LexicalOracle for Lexicon {
    fn senses(&self, word: &str) -> &[Synset] {
        self.by_word
            .get(&normalize(word))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn similarity(&self, a: &Synset, b: &Synset) -> Option<f32> {
        wu_palmer(a, b)
    }
}

/// Lookup key: lowercase, words joined by underscores.
fn normalize(word: &str) -> String {
    word.trim()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
