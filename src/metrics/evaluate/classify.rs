use std::fmt;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    config::ClassifierConfig,
    error::{MetricsError, Result},
    metrics::tfidf::TfIdfTable,
};

/// Label reported for documents that match no category
pub const UNCATEGORIZED: &str = "uncategorized";

/// A category and its weighted keywords
/// Keywords are stored trimmed and lowercased so they match tokenizer output.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryProfile {
    name: String,
    keywords: Vec<(String, f64)>,
}

impl CategoryProfile {
    pub fn new<K: AsRef<str>>(name: impl Into<String>, keywords: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|(term, weight)| (term.as_ref().trim().to_lowercase(), weight))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[(String, f64)] {
        &self.keywords
    }

    /// `Σ weight * tfidf(doc, keyword)`, absent keywords contribute zero
    pub fn score(&self, doc: &str, tfidf: &TfIdfTable<'_>) -> f64 {
        self.keywords
            .iter()
            .map(|(term, weight)| weight * tfidf.get_or_zero(doc, term))
            .sum()
    }
}

/// Category assigned to a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Assigned(String),
    Uncategorized,
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::Assigned(name) => name,
            Category::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Category::Uncategorized)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one document
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// category name -> score, in declaration order
    pub scores: IndexMap<String, f64>,
    pub category: Category,
    /// Score of the assigned category, `0.0` when uncategorized
    pub score: f64,
}

/// Keyword based document classifier
///
/// A document is assigned the category with the highest score, where a
/// category scores `Σ weight * tfidf(doc, keyword)` over its keywords.
/// Equal scores go to the category declared first. When the best score is
/// not positive, or does not exceed `min_score`, the document is
/// [`Category::Uncategorized`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    profiles: Vec<CategoryProfile>,
    min_score: f64,
}

impl Classifier {
    /// Create a classifier
    ///
    /// # Arguments
    /// * `profiles` - categories in declaration order
    /// * `min_score` - the best score must be strictly greater than this
    ///
    /// # Errors
    /// * [`MetricsError::DuplicateCategory`] when two profiles share a name
    /// * [`MetricsError::InvalidConfig`] for a non-finite weight or `min_score`
    pub fn new(profiles: Vec<CategoryProfile>, min_score: f64) -> Result<Self> {
        if !min_score.is_finite() {
            return Err(MetricsError::InvalidConfig("min_score must be finite".into()));
        }
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(MetricsError::DuplicateCategory(profile.name.clone()));
            }
            if let Some((term, weight)) = profile.keywords.iter().find(|(_, w)| !w.is_finite()) {
                return Err(MetricsError::InvalidConfig(format!(
                    "keyword `{term}` in `{}` has a non-finite weight {weight}",
                    profile.name
                )));
            }
        }
        Ok(Self { profiles, min_score })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let profiles = config
            .categories
            .iter()
            .map(|category| {
                CategoryProfile::new(
                    category.name.clone(),
                    category.keywords.iter().map(|k| (k.term.as_str(), k.weight)),
                )
            })
            .collect();
        Self::new(profiles, config.min_score)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(CategoryProfile::name)
    }

    /// Score every category for one document and pick the winner
    pub fn classify(&self, doc: &str, tfidf: &TfIdfTable<'_>) -> ClassificationResult {
        let scores: IndexMap<String, f64> = self
            .profiles
            .iter()
            .map(|profile| (profile.name.clone(), profile.score(doc, tfidf)))
            .collect();

        let mut best: Option<(&str, f64)> = None;
        for (name, &score) in &scores {
            // strict comparison keeps the first declared category on ties
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((name.as_str(), score));
            }
        }

        let (category, score) = match best {
            Some((name, score)) if score > 0.0 && score > self.min_score => {
                (Category::Assigned(name.to_string()), score)
            }
            _ => (Category::Uncategorized, 0.0),
        };
        ClassificationResult { scores, category, score }
    }

    /// Classify every document, keeping the given order
    pub fn classify_all<'d, I>(&self, docs: I, tfidf: &TfIdfTable<'_>) -> IndexMap<String, ClassificationResult>
    where
        I: IntoIterator<Item = &'d str>,
    {
        if self.profiles.is_empty() {
            warn!("no categories configured, every document is uncategorized");
        }
        let docs: Vec<&str> = docs.into_iter().collect();
        let results: Vec<(String, ClassificationResult)> = docs
            .par_iter()
            .map(|doc| (doc.to_string(), self.classify(doc, tfidf)))
            .collect();
        debug!(
            documents = results.len(),
            uncategorized = results.iter().filter(|(_, r)| r.category.is_uncategorized()).count(),
            "classified documents"
        );
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        corpus::Corpus,
        tabulate::FrequencyTables,
        tfidf::{DefaultScoreEngine, TermStatistics},
        tokenizer::Tokenizer,
    };

    fn tables(texts: &[(&str, &str)]) -> (FrequencyTables, TermStatistics) {
        let corpus = Corpus::tokenize(texts.iter().copied(), &Tokenizer::default()).unwrap();
        let tables = FrequencyTables::build(&corpus);
        let stats = TermStatistics::compute::<DefaultScoreEngine>(&tables);
        (tables, stats)
    }

    fn math_physics() -> Classifier {
        Classifier::new(
            vec![
                CategoryProfile::new("math", [("math", 1.0)]),
                CategoryProfile::new("physics", [("physics", 1.0)]),
            ],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn ubiquitous_keyword_scores_zero() {
        let (tables, stats) = tables(&[("doc1", "math math physics"), ("doc2", "physics chemistry")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = math_physics();

        let doc1 = classifier.classify("doc1", &tfidf);
        assert_eq!(doc1.category, Category::Assigned("math".into()));
        assert_eq!(doc1.score, 2.0 * 2f64.ln());
        assert_eq!(doc1.scores["physics"], 0.0);

        // physics appears everywhere, so its idf is zero
        let doc2 = classifier.classify("doc2", &tfidf);
        assert_eq!(doc2.category, Category::Uncategorized);
        assert_eq!(doc2.category.label(), UNCATEGORIZED);
        assert_eq!(doc2.score, 0.0);
    }

    #[test]
    fn tie_goes_to_first_declared() {
        let (tables, stats) = tables(&[("doc", "alpha beta"), ("other", "gamma")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = Classifier::new(
            vec![
                CategoryProfile::new("first", [("alpha", 1.0)]),
                CategoryProfile::new("second", [("beta", 1.0)]),
            ],
            0.0,
        )
        .unwrap();
        let result = classifier.classify("doc", &tfidf);
        assert_eq!(result.scores["first"], result.scores["second"]);
        assert_eq!(result.category, Category::Assigned("first".into()));
    }

    #[test]
    fn threshold_must_be_exceeded() {
        let (tables, stats) = tables(&[("doc1", "math math physics"), ("doc2", "physics chemistry")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let best = 2.0 * 2f64.ln();

        let at = Classifier::new(vec![CategoryProfile::new("math", [("math", 1.0)])], best).unwrap();
        assert!(at.classify("doc1", &tfidf).category.is_uncategorized());

        let below = Classifier::new(vec![CategoryProfile::new("math", [("math", 1.0)])], best - 0.01).unwrap();
        assert_eq!(below.classify("doc1", &tfidf).category.label(), "math");
    }

    #[test]
    fn negative_weights_can_leave_a_document_uncategorized() {
        let (tables, stats) = tables(&[("doc1", "math math physics"), ("doc2", "physics chemistry")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = Classifier::new(vec![CategoryProfile::new("anti", [("math", -1.0)])], -10.0).unwrap();
        let result = classifier.classify("doc1", &tfidf);
        assert!(result.scores["anti"] < 0.0);
        assert!(result.category.is_uncategorized());
    }

    #[test]
    fn no_categories_means_uncategorized() {
        let (tables, stats) = tables(&[("doc1", "math math"), ("doc2", "physics")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = Classifier::default();
        let all = classifier.classify_all(tables.documents().map(|(id, _)| id), &tfidf);
        assert_eq!(all.len(), 2);
        assert!(all.values().all(|r| r.category.is_uncategorized() && r.scores.is_empty()));
    }

    #[test]
    fn keywords_are_normalized() {
        let profile = CategoryProfile::new("math", [("  Math ", 2.0)]);
        assert_eq!(profile.keywords(), [("math".to_string(), 2.0)]);
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        for weight in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Classifier::new(
                vec![CategoryProfile::new("bad", [("zzz", weight)]), CategoryProfile::new("math", [("math", 1.0)])],
                0.0,
            )
            .unwrap_err();
            assert!(matches!(err, MetricsError::InvalidConfig(_)));
        }
        let err = Classifier::new(vec![CategoryProfile::new("math", [("math", 1.0)])], f64::NAN).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidConfig(_)));
    }

    #[test]
    fn scores_stay_finite_when_a_keyword_is_ubiquitous() {
        let (tables, stats) = tables(&[("doc1", "math math physics"), ("doc2", "physics chemistry")]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = Classifier::new(
            vec![
                CategoryProfile::new("heavy", [("physics", 1.0e300), ("zzz", 1.0e300)]),
                CategoryProfile::new("math", [("math", 1.0)]),
            ],
            0.0,
        )
        .unwrap();
        let result = classifier.classify("doc1", &tfidf);
        assert!(result.scores.values().all(|s| s.is_finite()));
        assert_eq!(result.category.label(), "math");
    }

    #[test]
    fn duplicate_profiles_are_rejected() {
        let err = Classifier::new(
            vec![CategoryProfile::new("a", [("x", 1.0)]), CategoryProfile::new("a", [("y", 1.0)])],
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::DuplicateCategory(name) if name == "a"));
    }

    #[test]
    fn classification_is_deterministic() {
        let (tables, stats) = tables(&[
            ("a", "algebra theorem physics"),
            ("b", "quantum energy algebra"),
            ("c", "python code code"),
            ("d", ""),
        ]);
        let tfidf = TfIdfTable::new(&tables, &stats);
        let classifier = Classifier::from_config(&ClassifierConfig::default()).unwrap();
        let first = classifier.classify_all(tables.documents().map(|(id, _)| id), &tfidf);
        for _ in 0..8 {
            assert_eq!(classifier.classify_all(tables.documents().map(|(id, _)| id), &tfidf), first);
        }
        let order: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
        assert_eq!(first["c"].category.label(), "programming");
        assert!(first["d"].category.is_uncategorized());
    }
}
