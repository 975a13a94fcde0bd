use std::collections::HashMap;

use ahash::RandomState;
use rayon::prelude::*;
use tracing::debug;

use crate::metrics::tabulate::FrequencyTables;

/// Scoring engine trait
/// Defines the corpus-global formulas derived from the frequency tables.
///
/// Both formulas must use the same logarithm base; keeping them on one
/// engine type keeps the base in a single place.
pub trait ScoreEngine {
    /// Inverse document frequency
    ///
    /// # Arguments
    /// * `doc_num` - number of documents `N`
    /// * `doc_freq` - number of documents containing the term
    fn idf(doc_num: u64, doc_freq: u64) -> f64;

    /// Balanced score
    ///
    /// # Arguments
    /// * `collection_freq` - total occurrences of the term
    /// * `doc_freq` - number of documents containing the term
    fn balanced_score(collection_freq: u64, doc_freq: u64) -> f64;
}

/// Default scoring engine, natural logarithm
/// - `idf = ln(N / DF)`, exactly `0.0` when `DF == N`
/// - `balanced = ln(CF + 1) * DF^2`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScoreEngine;

impl ScoreEngine for DefaultScoreEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        assert!(
            doc_freq >= 1 && doc_freq <= doc_num,
            "document frequency {doc_freq} outside 1..={doc_num}"
        );
        if doc_freq == doc_num {
            return 0.0;
        }
        (doc_num as f64 / doc_freq as f64).ln()
    }

    #[inline]
    fn balanced_score(collection_freq: u64, doc_freq: u64) -> f64 {
        assert!(doc_freq >= 1, "balanced score requested for a term with zero document frequency");
        assert!(
            collection_freq >= doc_freq,
            "collection frequency {collection_freq} below document frequency {doc_freq}"
        );
        (collection_freq as f64 + 1.0).ln() * (doc_freq as f64).powi(2)
    }
}

/// Corpus-global statistics per term: IDF and balanced score
#[derive(Debug, Clone, Default)]
pub struct TermStatistics {
    idf: HashMap<String, f64, RandomState>,
    balanced_score: HashMap<String, f64, RandomState>,
}

impl TermStatistics {
    /// Compute IDF and balanced score for every term of the tables
    /// An empty corpus skips the phase and yields empty tables.
    pub fn compute<E: ScoreEngine>(tables: &FrequencyTables) -> Self {
        let doc_num = tables.doc_num();
        if doc_num == 0 {
            debug!("empty corpus, statistics skipped");
            return Self::default();
        }
        let scored: Vec<(&String, f64, f64)> = tables
            .document_frequencies()
            .par_iter()
            .map(|(term, &doc_freq)| {
                let collection_freq = tables
                    .collection_frequency(term)
                    .expect("every term with a document frequency has a collection frequency");
                (term, E::idf(doc_num, doc_freq), E::balanced_score(collection_freq, doc_freq))
            })
            .collect();

        let mut idf = HashMap::with_capacity_and_hasher(scored.len(), RandomState::new());
        let mut balanced_score = HashMap::with_capacity_and_hasher(scored.len(), RandomState::new());
        for (term, term_idf, term_balanced) in scored {
            idf.insert(term.clone(), term_idf);
            balanced_score.insert(term.clone(), term_balanced);
        }
        debug!(terms = idf.len(), "computed idf and balanced scores");
        Self { idf, balanced_score }
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn balanced_score(&self, term: &str) -> Option<f64> {
        self.balanced_score.get(term).copied()
    }

    pub fn idf_table(&self) -> &HashMap<String, f64, RandomState> {
        &self.idf
    }

    pub fn balanced_score_table(&self) -> &HashMap<String, f64, RandomState> {
        &self.balanced_score
    }
}

/// Lazy TF-IDF view
/// Values are computed on demand from TF and IDF; only pairs present in a
/// document's TF table are ever produced.
#[derive(Debug, Clone, Copy)]
pub struct TfIdfTable<'a> {
    tables: &'a FrequencyTables,
    stats: &'a TermStatistics,
}

impl<'a> TfIdfTable<'a> {
    pub fn new(tables: &'a FrequencyTables, stats: &'a TermStatistics) -> Self {
        Self { tables, stats }
    }

    /// TF-IDF of a term in a document
    ///
    /// # Returns
    /// * `None` - unknown document, or a term never seen in the corpus
    /// * `Some(0.0)` - a known term absent from this document
    pub fn get(&self, doc: &str, term: &str) -> Option<f64> {
        let tf = self.tables.document(doc)?;
        let idf = self.stats.idf(term)?;
        Some(tf.term_count(term) as f64 * idf)
    }

    /// TF-IDF of a term in a document, `0.0` for anything absent
    #[inline]
    pub fn get_or_zero(&self, doc: &str, term: &str) -> f64 {
        self.get(doc, term).unwrap_or(0.0)
    }

    /// Sparse TF-IDF vector of a document, in no particular order
    pub fn document(&self, doc: &str) -> Option<Vec<(&'a str, f64)>> {
        let (tables, stats) = (self.tables, self.stats);
        let tf = tables.document(doc)?;
        Some(
            tf.iter()
                .map(|(term, count)| {
                    let idf = stats
                        .idf(term)
                        .expect("every counted term has an idf");
                    (term, count as f64 * idf)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{corpus::{Corpus, Document}, tokenizer::Tokenizer};

    fn scenario() -> (FrequencyTables, TermStatistics) {
        let corpus = Corpus::tokenize(
            [("doc1", "math math physics"), ("doc2", "physics chemistry")],
            &Tokenizer::default(),
        )
        .unwrap();
        let tables = FrequencyTables::build(&corpus);
        let stats = TermStatistics::compute::<DefaultScoreEngine>(&tables);
        (tables, stats)
    }

    #[test]
    fn idf_is_exactly_zero_for_ubiquitous_terms() {
        let (_, stats) = scenario();
        assert_eq!(stats.idf("physics"), Some(0.0));
        assert_eq!(stats.idf("math"), Some(2f64.ln()));
        assert_eq!(stats.idf("unknown"), None);
    }

    #[test]
    fn idf_increases_as_terms_get_rarer() {
        let n = 10;
        let values: Vec<f64> = (1..=n).map(|df| DefaultScoreEngine::idf(n, df)).collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(values[(n - 1) as usize], 0.0);
    }

    #[test]
    #[should_panic]
    fn idf_rejects_zero_document_frequency() {
        DefaultScoreEngine::idf(3, 0);
    }

    #[test]
    #[should_panic]
    fn idf_rejects_document_frequency_above_corpus_size() {
        DefaultScoreEngine::idf(3, 4);
    }

    #[test]
    fn balanced_score_formula() {
        let (_, stats) = scenario();
        // physics: CF = 2, DF = 2
        assert_eq!(stats.balanced_score("physics"), Some(3f64.ln() * 4.0));
        // math: CF = 2, DF = 1
        assert_eq!(stats.balanced_score("math"), Some(3f64.ln()));
    }

    #[test]
    fn balanced_score_is_monotone() {
        for df in 1..6u64 {
            for cf in df..20 {
                let base = DefaultScoreEngine::balanced_score(cf, df);
                assert!(DefaultScoreEngine::balanced_score(cf + 1, df) >= base);
                if df + 1 <= cf {
                    assert!(DefaultScoreEngine::balanced_score(cf, df + 1) >= base);
                }
            }
        }
    }

    #[test]
    fn tf_idf_is_lazy_and_sparse() {
        let (tables, stats) = scenario();
        let tfidf = TfIdfTable::new(&tables, &stats);
        assert_eq!(tfidf.get("doc1", "math"), Some(2.0 * 2f64.ln()));
        assert_eq!(tfidf.get("doc1", "physics"), Some(0.0));
        // known term, absent from the document
        assert_eq!(tfidf.get("doc1", "chemistry"), Some(0.0));
        assert_eq!(tfidf.get("doc1", "biology"), None);
        assert_eq!(tfidf.get("doc3", "math"), None);
        assert_eq!(tfidf.get_or_zero("doc3", "math"), 0.0);

        let mut doc1 = tfidf.document("doc1").unwrap();
        doc1.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(doc1, vec![("math", 2.0 * 2f64.ln()), ("physics", 0.0)]);
    }

    #[test]
    fn empty_corpus_skips_statistics() {
        let tables = FrequencyTables::build(&Corpus::new());
        let stats = TermStatistics::compute::<DefaultScoreEngine>(&tables);
        assert!(stats.idf_table().is_empty());
        assert!(stats.balanced_score_table().is_empty());
    }

    #[test]
    fn empty_document_has_empty_tf_idf() {
        let corpus = Corpus::from_documents([
            Document::new("blank", vec![]),
            Document::new("full", vec!["orbit".into()]),
        ])
        .unwrap();
        let tables = FrequencyTables::build(&corpus);
        let stats = TermStatistics::compute::<DefaultScoreEngine>(&tables);
        let tfidf = TfIdfTable::new(&tables, &stats);
        assert_eq!(tfidf.document("blank"), Some(vec![]));
        assert_eq!(tfidf.get("blank", "orbit"), Some(0.0));
    }
}
