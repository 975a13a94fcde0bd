use std::collections::HashMap;

use ahash::RandomState;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::metrics::{corpus::{counter::CollectionCounter, Corpus, Document}, term::TermFrequency};

/// TF, CF and DF tables of one corpus snapshot
/// Built once by [`FrequencyTables::build`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTables {
    /// document id -> term counts, in corpus order
    term_frequency: IndexMap<String, TermFrequency>,
    /// term -> total occurrences
    collection_frequency: HashMap<String, u64, RandomState>,
    /// term -> number of documents containing the term
    document_frequency: HashMap<String, u64, RandomState>,
}

impl FrequencyTables {
    /// Count every document independently, then merge into CF and DF
    /// Documents without tokens keep an empty TF entry and add nothing to CF/DF.
    pub fn build(corpus: &Corpus) -> Self {
        let counter = CollectionCounter::new();
        let docs: Vec<&Document> = corpus.iter().collect();
        let term_frequency: Vec<(String, TermFrequency)> = docs
            .par_iter()
            .map(|doc| {
                let tf = TermFrequency::from(doc.terms());
                counter.add_document(&tf);
                (doc.id().to_string(), tf)
            })
            .collect();
        debug!(
            documents = counter.doc_num(),
            vocabulary = counter.vocab_size(),
            "tabulated term frequencies"
        );
        let (collection_frequency, document_frequency) = counter.into_tables();

        Self {
            term_frequency: term_frequency.into_iter().collect(),
            collection_frequency,
            document_frequency,
        }
    }

    /// Number of documents `N`
    pub fn doc_num(&self) -> u64 {
        self.term_frequency.len() as u64
    }

    pub fn vocab_size(&self) -> usize {
        self.document_frequency.len()
    }

    /// Total number of tokens over all documents
    pub fn token_sum(&self) -> u64 {
        self.term_frequency.values().map(TermFrequency::term_sum).sum()
    }

    pub fn document(&self, doc: &str) -> Option<&TermFrequency> {
        self.term_frequency.get(doc)
    }

    pub fn documents(&self) -> impl Iterator<Item = (&str, &TermFrequency)> {
        self.term_frequency.iter().map(|(id, tf)| (id.as_str(), tf))
    }

    pub fn contains_doc(&self, doc: &str) -> bool {
        self.term_frequency.contains_key(doc)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    pub fn collection_frequency(&self, term: &str) -> Option<u64> {
        self.collection_frequency.get(term).copied()
    }

    pub fn document_frequency(&self, term: &str) -> Option<u64> {
        self.document_frequency.get(term).copied()
    }

    pub fn collection_frequencies(&self) -> &HashMap<String, u64, RandomState> {
        &self.collection_frequency
    }

    pub fn document_frequencies(&self) -> &HashMap<String, u64, RandomState> {
        &self.document_frequency
    }
}
