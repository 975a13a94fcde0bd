//! This crate is a Corpus Metrics Engine: term statistics and keyword
//! classification over a collection of text documents.

pub mod config;
pub mod error;
pub mod export;
pub mod metrics;

/// Metrics Model
/// The top-level struct of this crate, a read-only view over one analyzed corpus.
/// It turns `(id, text)` pairs into frequency tables, derived statistics and
/// one category per document.
///
/// Internally, it holds:
/// - Per-document term counts (TF)
/// - Collection and document frequencies (CF, DF)
/// - IDF and balanced score per term
/// - The classifier and its results
///
/// TF-IDF values are computed on demand and never stored.
///
/// `MetricsModel<E>` is generic over the scoring engine `E`
/// (default: `DefaultScoreEngine`).
///
/// # Examples
/// ```
/// use corpus_metrics::{EngineConfig, MetricsModel};
/// let model: MetricsModel = MetricsModel::from_texts(
///     [("doc1", "math math physics"), ("doc2", "physics chemistry")],
///     &EngineConfig::default(),
/// ).unwrap();
/// assert_eq!(model.collection_frequency("math"), Some(2));
/// assert_eq!(model.idf("physics"), Some(0.0));
/// assert_eq!(model.idf("biology"), None);
/// ```
pub use metrics::{CorpusSummary, MetricsModel};

/// Corpus and Document
/// A `Corpus` is the ordered set of tokenized documents of one run.
/// Document ids are unique; pushing a duplicate is an error.
pub use metrics::corpus::{Corpus, Document};

/// Tokenizer
/// Lowercases text, splits it on Unicode word boundaries and drops stop words,
/// short tokens and purely numeric tokens.
pub use metrics::tokenizer::{StopWords, Tokenizer};

/// Term Frequency structure
/// Counts the occurrences of each term within one document.
pub use metrics::term::TermFrequency;

/// Frequency tables (TF, CF, DF) of one corpus
pub use metrics::tabulate::FrequencyTables;

/// Score Engine Trait
/// Defines how IDF and the balanced score are computed.
/// `DefaultScoreEngine` uses the natural logarithm.
pub use metrics::tfidf::{DefaultScoreEngine, ScoreEngine, TermStatistics, TfIdfTable};

/// Classification
/// - `Classifier`: weighted keyword classifier, first declared category wins ties
/// - `CategoryProfile`: one category and its keywords
/// - `ClassificationResult`: per-category scores and the assigned category
pub use metrics::evaluate::classify::{Category, CategoryProfile, ClassificationResult, Classifier, UNCATEGORIZED};

/// Rankings for charts and tables
pub use metrics::evaluate::ranking::{Ranking, SortOrder, TermMetric};

pub use config::EngineConfig;
pub use error::{MetricsError, Result};
pub use export::{ExportFormat, MetricsSnapshot, SnapshotCodec};
