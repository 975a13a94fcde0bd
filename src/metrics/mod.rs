pub mod corpus;
pub mod evaluate;
pub mod tabulate;
pub mod term;
pub mod tfidf;
pub mod tokenizer;

use std::{fmt, marker::PhantomData};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    error::Result,
    export::MetricsSnapshot,
    metrics::{
        corpus::Corpus,
        evaluate::{
            classify::{Category, ClassificationResult, Classifier, UNCATEGORIZED},
            ranking::{Ranking, SortOrder, TermMetric},
        },
        tabulate::FrequencyTables,
        term::TermFrequency,
        tfidf::{DefaultScoreEngine, ScoreEngine, TermStatistics, TfIdfTable},
        tokenizer::Tokenizer,
    },
};

/// Read-only view over one analyzed corpus
///
/// Built in one pass (tabulate, compute statistics, classify) and never
/// mutated afterwards, so it can be shared across threads freely.
///
/// Lookups distinguish "not found" from zero: an unknown document or term
/// yields `None`, while a known term that is absent from a document yields
/// `Some(0)` for TF and TF-IDF.
///
/// `MetricsModel<E>` is generic over the [`ScoreEngine`] computing IDF and
/// the balanced score.
#[derive(Debug, Clone)]
pub struct MetricsModel<E = DefaultScoreEngine>
where
    E: ScoreEngine,
{
    tables: FrequencyTables,
    stats: TermStatistics,
    classifier: Classifier,
    classifications: IndexMap<String, ClassificationResult>,
    _marker: PhantomData<E>,
}

/// Corpus-level counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusSummary {
    pub documents: u64,
    pub vocabulary: usize,
    pub tokens: u64,
}

impl fmt::Display for CorpusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "documents: {}, vocabulary: {}, tokens: {}",
            self.documents, self.vocabulary, self.tokens
        )
    }
}

impl<E> MetricsModel<E>
where
    E: ScoreEngine,
{
    /// Analyze a tokenized corpus
    ///
    /// # Arguments
    /// * `corpus` - documents to analyze
    /// * `classifier` - category profiles used to label each document
    pub fn build(corpus: &Corpus, classifier: Classifier) -> Self {
        if corpus.is_empty() {
            warn!("empty corpus, every table will be empty");
        }
        let tables = FrequencyTables::build(corpus);
        let stats = TermStatistics::compute::<E>(&tables);
        let classifications = {
            let tfidf = TfIdfTable::new(&tables, &stats);
            classifier.classify_all(tables.documents().map(|(id, _)| id), &tfidf)
        };
        let model = Self {
            tables,
            stats,
            classifier,
            classifications,
            _marker: PhantomData,
        };
        info!(
            documents = model.doc_num(),
            vocabulary = model.vocab_size(),
            uncategorized = model.category_sizes().get(UNCATEGORIZED).copied().unwrap_or(0),
            "metrics model built"
        );
        model
    }

    /// Tokenize raw `(id, text)` pairs and analyze them
    ///
    /// # Errors
    /// Fails on duplicate document ids or an invalid classifier configuration.
    pub fn from_texts<I, K, T>(texts: I, config: &EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: AsRef<str> + Send + Sync,
    {
        let classifier = Classifier::from_config(&config.classifier)?;
        let tokenizer = Tokenizer::from_config(&config.tokenizer);
        let corpus = Corpus::tokenize(texts, &tokenizer)?;
        Ok(Self::build(&corpus, classifier))
    }

    /// Number of documents `N`
    pub fn doc_num(&self) -> u64 {
        self.tables.doc_num()
    }

    /// Number of distinct terms
    pub fn vocab_size(&self) -> usize {
        self.tables.vocab_size()
    }

    /// Total tokens over all documents
    pub fn token_sum(&self) -> u64 {
        self.tables.token_sum()
    }

    pub fn summary(&self) -> CorpusSummary {
        CorpusSummary {
            documents: self.doc_num(),
            vocabulary: self.vocab_size(),
            tokens: self.token_sum(),
        }
    }

    pub fn contains_doc(&self, doc: &str) -> bool {
        self.tables.contains_doc(doc)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.tables.contains_term(term)
    }

    /// Document ids in corpus order
    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.documents().map(|(id, _)| id)
    }

    /// All distinct terms, sorted
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.tables.document_frequencies().keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    pub fn collection_frequency(&self, term: &str) -> Option<u64> {
        self.tables.collection_frequency(term)
    }

    pub fn document_frequency(&self, term: &str) -> Option<u64> {
        self.tables.document_frequency(term)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.stats.idf(term)
    }

    pub fn balanced_score(&self, term: &str) -> Option<f64> {
        self.stats.balanced_score(term)
    }

    /// Corpus-global metric of a term
    pub fn metric(&self, metric: TermMetric, term: &str) -> Option<f64> {
        match metric {
            TermMetric::CollectionFrequency => self.collection_frequency(term).map(|v| v as f64),
            TermMetric::DocumentFrequency => self.document_frequency(term).map(|v| v as f64),
            TermMetric::Idf => self.idf(term),
            TermMetric::BalancedScore => self.balanced_score(term),
        }
    }

    /// Count of `term` in `doc`
    ///
    /// # Returns
    /// * `None` - unknown document or term
    /// * `Some(0)` - known term absent from this document
    pub fn term_frequency(&self, doc: &str, term: &str) -> Option<u64> {
        let tf = self.tables.document(doc)?;
        if !self.tables.contains_term(term) {
            return None;
        }
        Some(tf.term_count(term))
    }

    pub fn document_term_frequencies(&self, doc: &str) -> Option<&TermFrequency> {
        self.tables.document(doc)
    }

    pub fn tf_idf_table(&self) -> TfIdfTable<'_> {
        TfIdfTable::new(&self.tables, &self.stats)
    }

    /// TF-IDF of `term` in `doc`, same `None` rules as [`Self::term_frequency`]
    pub fn tf_idf(&self, doc: &str, term: &str) -> Option<f64> {
        self.tf_idf_table().get(doc, term)
    }

    /// Sparse TF-IDF vector of one document
    pub fn document_tf_idf(&self, doc: &str) -> Option<Vec<(&str, f64)>> {
        self.tf_idf_table().document(doc)
    }

    /// Top `k` terms by a corpus-global metric
    /// Equal values are ordered by term.
    pub fn top_terms(&self, metric: TermMetric, k: usize, order: SortOrder) -> Ranking {
        self.tables
            .document_frequencies()
            .keys()
            .filter_map(|term| Some((term.clone(), self.metric(metric, term)?)))
            .collect::<Ranking>()
            .top(k, order)
    }

    /// Top `k` terms of a document by raw count
    pub fn document_tf_ranking(&self, doc: &str, k: usize, order: SortOrder) -> Option<Ranking> {
        let tf = self.tables.document(doc)?;
        Some(
            tf.iter()
                .map(|(term, count)| (term.to_string(), count as f64))
                .collect::<Ranking>()
                .top(k, order),
        )
    }

    /// Top `k` terms of a document by TF-IDF
    pub fn document_tf_idf_ranking(&self, doc: &str, k: usize, order: SortOrder) -> Option<Ranking> {
        let vector = self.document_tf_idf(doc)?;
        Some(
            vector
                .into_iter()
                .map(|(term, value)| (term.to_string(), value))
                .collect::<Ranking>()
                .top(k, order),
        )
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classification(&self, doc: &str) -> Option<&ClassificationResult> {
        self.classifications.get(doc)
    }

    /// Classification of every document, in corpus order
    pub fn classifications(&self) -> &IndexMap<String, ClassificationResult> {
        &self.classifications
    }

    /// Category label -> document ids
    /// Categories appear in declaration order, including empty ones,
    /// followed by `uncategorized` when any document is left over.
    pub fn category_groups(&self) -> IndexMap<String, Vec<&str>> {
        let mut groups: IndexMap<String, Vec<&str>> = self
            .classifier
            .category_names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        let mut uncategorized = Vec::new();
        for (doc, result) in &self.classifications {
            match &result.category {
                Category::Assigned(name) => groups.entry(name.clone()).or_default().push(doc.as_str()),
                Category::Uncategorized => uncategorized.push(doc.as_str()),
            }
        }
        if !uncategorized.is_empty() {
            groups.insert(UNCATEGORIZED.to_string(), uncategorized);
        }
        groups
    }

    /// Category label -> number of documents, ordered like [`Self::category_groups`]
    pub fn category_sizes(&self) -> IndexMap<String, usize> {
        self.category_groups()
            .into_iter()
            .map(|(name, docs)| (name, docs.len()))
            .collect()
    }

    /// Serializable copy of every table
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_model(self)
    }
}
