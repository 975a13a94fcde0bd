use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// Top level engine configuration
/// Every section falls back to its defaults, so a partial file is valid.
///
/// # Examples
/// ```
/// use corpus_metrics::config::EngineConfig;
/// let config = EngineConfig::from_toml_str(r#"
/// [tokenizer]
/// min_term_len = 3
///
/// [[classifier.categories]]
/// name = "astronomy"
/// keywords = [{ term = "planet" }, { term = "orbit", weight = 2.0 }]
/// "#).unwrap();
/// assert_eq!(config.tokenizer.min_term_len, 3);
/// assert_eq!(config.classifier.categories[0].keywords[1].weight, 2.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub tokenizer: TokenizerConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Minimum term length in characters
    pub min_term_len: usize,
    /// Drop tokens without any alphabetic character (`42`, `3.14`)
    pub drop_numeric: bool,
    /// Stop word list
    /// `None` selects the built-in English list
    pub stop_words: Option<Vec<String>>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_term_len: 2,
            drop_numeric: true,
            stop_words: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// The best category score must exceed this value to be assigned
    pub min_score: f64,
    /// Categories in declaration order; order decides ties
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<KeywordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordConfig {
    pub term: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
            ("mathematics", &["math", "calculus", "algebra", "geometry", "equation", "theorem", "integral", "derivative"]),
            ("physics", &["physics", "force", "energy", "mass", "velocity", "gravity", "quantum", "relativity", "thermodynamics"]),
            ("chemistry", &["chemistry", "element", "compound", "reaction", "molecule", "acid", "base", "organic", "inorganic"]),
            ("programming", &["python", "java", "code", "algorithm", "function", "class", "variable", "pointer", "software", "database"]),
        ];
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, terms)| CategoryConfig {
                name: name.to_string(),
                keywords: terms
                    .iter()
                    .map(|term| KeywordConfig { term: term.to_string(), weight: 1.0 })
                    .collect(),
            })
            .collect();
        Self { min_score: 0.0, categories }
    }
}

impl ClassifierConfig {
    /// Build a configuration from flat `(category, keyword, weight)` triples
    /// Categories keep the order of their first appearance.
    pub fn from_triples<C, K>(triples: impl IntoIterator<Item = (C, K, f64)>, min_score: f64) -> Self
    where
        C: Into<String>,
        K: Into<String>,
    {
        let mut categories: Vec<CategoryConfig> = Vec::new();
        for (category, term, weight) in triples {
            let category = category.into();
            let keyword = KeywordConfig { term: term.into(), weight };
            match categories.iter_mut().find(|c| c.name == category) {
                Some(existing) => existing.keywords.push(keyword),
                None => categories.push(CategoryConfig { name: category, keywords: vec![keyword] }),
            }
        }
        Self { min_score, categories }
    }

    /// Check names and weights
    pub fn validate(&self) -> Result<()> {
        if !self.min_score.is_finite() {
            return Err(MetricsError::InvalidConfig("min_score must be finite".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(MetricsError::InvalidConfig("category name must not be empty".into()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(MetricsError::DuplicateCategory(category.name.clone()));
            }
            for keyword in &category.keywords {
                if !keyword.weight.is_finite() {
                    return Err(MetricsError::InvalidConfig(format!(
                        "keyword `{}` in `{}` has a non-finite weight",
                        keyword.term, category.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.classifier.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.classifier.validate()?;
        Ok(config)
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(MetricsError::InvalidConfig(format!(
                "unsupported config file `{}` (expected .json or .toml)",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_categories() {
        let config = EngineConfig::default();
        assert_eq!(config.tokenizer.min_term_len, 2);
        assert!(config.tokenizer.drop_numeric);
        let names: Vec<&str> = config.classifier.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["mathematics", "physics", "chemistry", "programming"]);
        assert!(config.classifier.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "classifier": { "min_score": 0.5, "categories": [] } }"#).unwrap();
        assert_eq!(config.tokenizer, TokenizerConfig::default());
        assert_eq!(config.classifier.min_score, 0.5);
        assert!(config.classifier.categories.is_empty());
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let err = EngineConfig::from_json_str(
            r#"{ "classifier": { "categories": [ { "name": "a" }, { "name": "a" } ] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::DuplicateCategory(name) if name == "a"));
    }

    #[test]
    fn triples_group_by_first_appearance() {
        let config = ClassifierConfig::from_triples(
            [("b", "x", 1.0), ("a", "y", 2.0), ("b", "z", 0.5)],
            0.0,
        );
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "b");
        assert_eq!(config.categories[0].keywords.len(), 2);
        assert_eq!(config.categories[1].keywords[0].weight, 2.0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        fs::write(&path, "tokenizer: {}").unwrap();
        assert!(matches!(EngineConfig::from_path(&path), Err(MetricsError::InvalidConfig(_))));
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[tokenizer]\nstop_words = [\"foo\"]\n").unwrap();
        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.tokenizer.stop_words, Some(vec!["foo".to_string()]));
        assert_eq!(config.classifier.categories.len(), 4);
    }
}
