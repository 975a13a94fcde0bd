use std::collections::HashSet;

use ahash::RandomState;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenizerConfig;

/// Built-in English stop word list
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "may", "me", "might", "more", "most", "must", "my", "myself", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "same", "shall", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "upon", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Stop word set
/// Entries are lowercased on construction so they match normalized tokens.
#[derive(Debug, Clone)]
pub struct StopWords(HashSet<String, RandomState>);

impl StopWords {
    pub fn new<T: AsRef<str>>(words: &[T]) -> Self {
        Self(words.iter().map(|w| w.as_ref().trim().to_lowercase()).collect())
    }

    pub fn empty() -> Self {
        Self(HashSet::with_hasher(RandomState::new()))
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.0.contains(term)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

/// Turns raw document text into an ordered sequence of normalized terms.
///
/// Normalization lowercases the text, splits it on Unicode word boundaries
/// and then on every non-alphanumeric character inside a word.
/// Stop words, words shorter than `min_term_len` characters and (optionally)
/// words without a single alphabetic character are dropped.
///
/// # Examples
/// ```
/// use corpus_metrics::Tokenizer;
/// let tokenizer = Tokenizer::default();
/// assert_eq!(tokenizer.tokenize("The Integral of x, in 2024!"), ["integral"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: StopWords,
    min_term_len: usize,
    drop_numeric: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::from_config(&TokenizerConfig::default())
    }
}

impl Tokenizer {
    pub fn new(stop_words: StopWords, min_term_len: usize, drop_numeric: bool) -> Self {
        Self {
            stop_words,
            min_term_len,
            drop_numeric,
        }
    }

    pub fn from_config(config: &TokenizerConfig) -> Self {
        let stop_words = match &config.stop_words {
            Some(words) => StopWords::new(words),
            None => StopWords::default(),
        };
        Self::new(stop_words, config.min_term_len, config.drop_numeric)
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Tokenize a text
    /// Never fails; empty or punctuation-only input yields an empty vector.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        lowered
            .unicode_words()
            // word boundaries keep `a.b`, `x:y` and `don't` whole
            .flat_map(|word| word.split(|c: char| !c.is_alphanumeric()))
            .filter(|word| self.accepts(word))
            .map(str::to_owned)
            .collect()
    }

    #[inline]
    fn accepts(&self, word: &str) -> bool {
        if word.is_empty() || word.chars().count() < self.min_term_len {
            return false;
        }
        if self.drop_numeric && !word.chars().any(char::is_alphabetic) {
            return false;
        }
        !self.stop_words.contains(word)
    }
}
