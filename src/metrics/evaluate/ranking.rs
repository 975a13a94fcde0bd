use std::{fmt, str::FromStr};

use crate::error::MetricsError;

/// Corpus-global per-term metrics that can be ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMetric {
    /// Collection frequency (CF)
    CollectionFrequency,
    /// Document frequency (DF)
    DocumentFrequency,
    /// Inverse document frequency (IDF)
    Idf,
    /// `ln(CF + 1) * DF^2`
    BalancedScore,
}

impl TermMetric {
    pub fn label(&self) -> &'static str {
        match self {
            TermMetric::CollectionFrequency => "CF",
            TermMetric::DocumentFrequency => "DF",
            TermMetric::Idf => "IDF",
            TermMetric::BalancedScore => "BALANCED_SCORE",
        }
    }
}

impl FromStr for TermMetric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cf" | "collection" | "collection-frequency" => Ok(TermMetric::CollectionFrequency),
            "df" | "document" | "document-frequency" => Ok(TermMetric::DocumentFrequency),
            "idf" => Ok(TermMetric::Idf),
            "balanced" | "balanced-score" => Ok(TermMetric::BalancedScore),
            _ => Err(MetricsError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for TermMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sort direction of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// Ordered `(label, value)` pairs, ready for charting
/// Equal values are ordered by label (ascending) in both directions, so
/// output is stable across runs.
#[derive(Clone, PartialEq, Default)]
pub struct Ranking {
    /// (label, value)
    pub list: Vec<(String, f64)>,
}

impl Ranking {
    /// Create a new Ranking instance
    pub fn new(list: Vec<(String, f64)>) -> Self {
        Ranking { list }
    }

    /// Sort in the given order and keep the first `k` entries
    pub fn top(mut self, k: usize, order: SortOrder) -> Self {
        match order {
            SortOrder::Descending => self.sort_by_value_desc(),
            SortOrder::Ascending => self.sort_by_value_asc(),
        };
        self.list.truncate(k);
        self
    }

    /// Sort results by descending value
    pub fn sort_by_value_desc(&mut self) -> &mut Self {
        self.list.retain(|(_, v)| !v.is_nan());
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        self
    }

    /// Sort results by ascending value
    pub fn sort_by_value_asc(&mut self) -> &mut Self {
        self.list.retain(|(_, v)| !v.is_nan());
        self.list.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.list.iter().map(|(label, value)| (label.as_str(), *value))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.list.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.list.iter().map(|(_, value)| *value).collect()
    }
}

impl fmt::Debug for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Ranking [")?;
            for (label, value) in &self.list {
                writeln!(f, "    {:?}: {:.6}", label, value)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// One line per entry: `<value>\t<label>`
impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.list {
            writeln!(f, "{:.4}\t{}", value, label)?;
        }
        Ok(())
    }
}

impl FromIterator<(String, f64)> for Ranking {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Ranking::new(iter.into_iter().collect())
    }
}
