pub mod counter;

use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::{error::{MetricsError, Result}, metrics::tokenizer::Tokenizer};

/// A tokenized document
/// Immutable once built; the terms keep their order of appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    terms: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, terms: Vec<String>) -> Self {
        Self { id: id.into(), terms }
    }

    pub fn from_text(id: impl Into<String>, text: &str, tokenizer: &Tokenizer) -> Self {
        Self::new(id, tokenizer.tokenize(text))
    }

    /// Document id for a source file: its file stem
    /// `books/Linear Algebra.txt` becomes `Linear Algebra`.
    pub fn id_from_path(path: &Path) -> String {
        path.file_stem()
            .or_else(|| path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn token_count(&self) -> usize {
        self.terms.len()
    }
}

/// The set of documents analyzed in one run
/// Document ids are unique; insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: IndexMap<String, Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            documents: IndexMap::new(),
        }
    }

    /// Add a document
    /// Fails when a document with the same id is already present.
    pub fn push(&mut self, doc: Document) -> Result<()> {
        if self.documents.contains_key(doc.id()) {
            return Err(MetricsError::DuplicateDocument(doc.id));
        }
        self.documents.insert(doc.id.clone(), doc);
        Ok(())
    }

    pub fn from_documents(docs: impl IntoIterator<Item = Document>) -> Result<Self> {
        let mut corpus = Self::new();
        for doc in docs {
            corpus.push(doc)?;
        }
        Ok(corpus)
    }

    /// Tokenize `(id, text)` pairs in parallel and collect them in input order
    ///
    /// # Arguments
    /// * `texts` - document id and raw text pairs
    /// * `tokenizer` - tokenizer shared by all workers
    pub fn tokenize<I, K, T>(texts: I, tokenizer: &Tokenizer) -> Result<Self>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: AsRef<str> + Send + Sync,
    {
        let texts: Vec<(String, T)> = texts.into_iter().map(|(id, text)| (id.into(), text)).collect();
        let docs: Vec<Document> = texts
            .par_iter()
            .map(|(id, text)| Document::from_text(id.clone(), text.as_ref(), tokenizer))
            .collect();
        Self::from_documents(docs)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }
}
