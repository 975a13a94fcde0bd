use std::{collections::HashMap, sync::atomic::{AtomicU64, Ordering}};

use ahash::RandomState;
use dashmap::DashMap;

use crate::metrics::term::TermFrequency;

/// Accumulates collection and document frequencies in a thread-safe way
/// Workers merge their private per-document tables concurrently; the merge
/// is commutative, so the final counts do not depend on arrival order.
#[derive(Debug, Default)]
pub struct CollectionCounter {
    /// number of merged documents
    doc_num: AtomicU64,
    /// term -> total occurrences over all documents
    collection_counts: DashMap<Box<str>, u64, RandomState>,
    /// term -> number of documents containing it
    document_counts: DashMap<Box<str>, u64, RandomState>,
}

impl CollectionCounter {
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            collection_counts: DashMap::with_hasher(RandomState::new()),
            document_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Merge one document's term table
    /// Each term counts once towards its document frequency.
    pub fn add_document(&self, doc: &TermFrequency) {
        self.doc_num.fetch_add(1, Ordering::Relaxed);
        for (term, count) in doc.iter() {
            self.collection_counts
                .entry(term.into())
                .and_modify(|c| *c += count)
                .or_insert(count);
            self.document_counts
                .entry(term.into())
                .and_modify(|c| *c += 1)
                .or_insert(1);
        }
    }

    pub fn doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    pub fn vocab_size(&self) -> usize {
        self.document_counts.len()
    }

    /// Freeze into plain `(collection, document)` frequency maps
    pub fn into_tables(self) -> (HashMap<String, u64, RandomState>, HashMap<String, u64, RandomState>) {
        let collection = self
            .collection_counts
            .into_iter()
            .map(|(term, count)| (term.into_string(), count))
            .collect();
        let document = self
            .document_counts
            .into_iter()
            .map(|(term, count)| (term.into_string(), count))
            .collect();
        (collection, document)
    }
}
