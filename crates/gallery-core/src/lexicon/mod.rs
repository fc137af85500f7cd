//! Lexical sense database used to classify labels.
//!
//! The classifier only needs two things from a lexical ontology: the ordered
//! senses of a word, and a similarity score between two senses. Those are
//! expressed by [`LexicalOracle`]; [`Lexicon`] is the WordNet-backed
//! implementation loaded from disk once per process.

pub mod oracle;
pub mod wordnet;

pub use oracle::{wu_palmer, LexicalOracle, Synset};
pub use wordnet::Lexicon;

/// Bundled lexicon, shared by tests across modules.
#[cfg(test)]
pub(crate) fn bundled_lexicon() -> Lexicon {
    Lexicon::parse(wordnet::BUNDLED_NOUNS)
}
