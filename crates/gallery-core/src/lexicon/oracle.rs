//! Sense lookup and Wu-Palmer similarity.

/// One sense of a word, with its WordNet hypernym chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synset {
    /// Synset identifier (e.g. "dog.n.01")
    pub id: String,
    /// Lemma this sense was listed under, display form (spaces, not underscores)
    pub lemma: String,
    /// Hypernym chain, most specific ancestor first, root last
    pub hypernyms: Vec<String>,
}

impl Synset {
    pub fn new(id: impl Into<String>, lemma: impl Into<String>, hypernyms: Vec<String>) -> Self {
        Self {
            id: id.into(),
            lemma: lemma.into(),
            hypernyms,
        }
    }

    /// Nodes from the root down to this sense, inclusive.
    pub fn root_path(&self) -> impl Iterator<Item = &str> {
        self.hypernyms
            .iter()
            .rev()
            .map(String::as_str)
            .chain(std::iter::once(self.lemma.as_str()))
    }

    /// Depth counted in nodes; the root has depth 1.
    pub fn depth(&self) -> usize {
        self.hypernyms.len() + 1
    }
}

/// Source of word senses and sense-to-sense similarity.
///
/// Implementations must be immutable once built: the classifier reads them
/// from many tasks without synchronization.
pub trait LexicalOracle: Send + Sync {
    /// Senses of `word` in canonical order. Empty if the word is unknown.
    fn senses(&self, word: &str) -> &[Synset];

    /// Symmetric similarity in [0, 1], or `None` when the senses share no ancestor.
    fn similarity(&self, a: &Synset, b: &Synset) -> Option<f32>;

    /// The first (most common) sense of `word`.
    fn primary_sense(&self, word: &str) -> Option<&Synset> {
        self.senses(word).first()
    }
}

/// Wu-Palmer similarity: `2 * depth(lcs) / (depth(a) + depth(b))`.
///
/// The least common subsumer is the deepest node shared by both root paths.
pub fn wu_palmer(a: &Synset, b: &Synset) -> Option<f32> {
    if a.id == b.id {
        return Some(1.0);
    }

    let lcs_depth = a
        .root_path()
        .zip(b.root_path())
        .take_while(|(x, y)| x == y)
        .count();

    if lcs_depth == 0 {
        return None;
    }

    Some((2 * lcs_depth) as f32 / (a.depth() + b.depth()) as f32)
}
