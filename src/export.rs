use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{MetricsError, Result},
    metrics::{tfidf::ScoreEngine, MetricsModel},
};

/// Serializable copy of every table of a [`MetricsModel`]
/// Maps are ordered by key so encodings are reproducible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub document_count: u64,
    /// document -> term -> count
    pub term_frequency: BTreeMap<String, BTreeMap<String, u64>>,
    /// document -> term -> tf-idf, only terms present in the document
    pub tf_idf: BTreeMap<String, BTreeMap<String, f64>>,
    pub collection_frequency: BTreeMap<String, u64>,
    pub document_frequency: BTreeMap<String, u64>,
    pub idf: BTreeMap<String, f64>,
    pub balanced_score: BTreeMap<String, f64>,
    pub classification: BTreeMap<String, DocumentClassification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentClassification {
    /// assigned category or `uncategorized`
    pub category: String,
    pub score: f64,
    /// every category score, in declaration order
    pub scores: Vec<CategoryScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: f64,
}

impl MetricsSnapshot {
    pub fn from_model<E: ScoreEngine>(model: &MetricsModel<E>) -> Self {
        let mut snapshot = Self {
            document_count: model.doc_num(),
            ..Self::default()
        };

        for doc in model.document_ids() {
            if let Some(tf) = model.document_term_frequencies(doc) {
                snapshot
                    .term_frequency
                    .insert(doc.to_string(), tf.iter().map(|(t, c)| (t.to_string(), c)).collect());
            }
            if let Some(vector) = model.document_tf_idf(doc) {
                snapshot
                    .tf_idf
                    .insert(doc.to_string(), vector.into_iter().map(|(t, v)| (t.to_string(), v)).collect());
            }
        }

        for term in model.vocabulary() {
            let key = || term.to_string();
            if let Some(cf) = model.collection_frequency(term) {
                snapshot.collection_frequency.insert(key(), cf);
            }
            if let Some(df) = model.document_frequency(term) {
                snapshot.document_frequency.insert(key(), df);
            }
            if let Some(idf) = model.idf(term) {
                snapshot.idf.insert(key(), idf);
            }
            if let Some(score) = model.balanced_score(term) {
                snapshot.balanced_score.insert(key(), score);
            }
        }

        for (doc, result) in model.classifications() {
            snapshot.classification.insert(
                doc.clone(),
                DocumentClassification {
                    category: result.category.label().to_string(),
                    score: result.score,
                    scores: result
                        .scores
                        .iter()
                        .map(|(name, &score)| CategoryScore { name: name.clone(), score })
                        .collect(),
                },
            );
        }
        snapshot
    }
}

/// Persistence strategy for snapshots
pub trait SnapshotCodec {
    fn encode(&self, snapshot: &MetricsSnapshot, writer: &mut dyn Write) -> Result<()>;
    fn decode(&self, reader: &mut dyn Read) -> Result<MetricsSnapshot>;
    /// File extension without the dot
    fn extension(&self) -> &'static str;
}

/// Human readable, pretty printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SnapshotCodec for JsonCodec {
    fn encode(&self, snapshot: &MetricsSnapshot, writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, snapshot)?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<MetricsSnapshot> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Compact binary CBOR
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl SnapshotCodec for CborCodec {
    fn encode(&self, snapshot: &MetricsSnapshot, writer: &mut dyn Write) -> Result<()> {
        serde_cbor::to_writer(writer, snapshot)?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<MetricsSnapshot> {
        Ok(serde_cbor::from_reader(reader)?)
    }

    fn extension(&self) -> &'static str {
        "cbor"
    }
}

/// Snapshot format selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Cbor,
}

impl ExportFormat {
    pub fn codec(&self) -> Box<dyn SnapshotCodec> {
        match self {
            ExportFormat::Json => Box::new(JsonCodec),
            ExportFormat::Cbor => Box::new(CborCodec),
        }
    }

    pub fn extension(&self) -> &'static str {
        self.codec().extension()
    }
}

impl FromStr for ExportFormat {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "cbor" => Ok(ExportFormat::Cbor),
            _ => Err(MetricsError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write a snapshot to `path`
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &MetricsSnapshot, path: P, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    format.codec().encode(snapshot, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), %format, "snapshot written");
    Ok(())
}

/// Read a snapshot from `path`
/// Malformed content is an error, never an empty snapshot.
pub fn load_snapshot<P: AsRef<Path>>(path: P, format: ExportFormat) -> Result<MetricsSnapshot> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let snapshot = format.codec().decode(&mut reader)?;
    debug!(path = %path.display(), documents = snapshot.document_count, "snapshot loaded");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, metrics::MetricsModel};

    fn model() -> MetricsModel {
        MetricsModel::from_texts(
            [
                ("algebra", "algebra theorem equation algebra"),
                ("mechanics", "force energy mass velocity"),
                ("notes", "orbit orbit"),
            ],
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_mirrors_model() {
        let model = model();
        let snapshot = model.snapshot();
        assert_eq!(snapshot.document_count, 3);
        assert_eq!(snapshot.term_frequency["algebra"]["algebra"], 2);
        assert_eq!(snapshot.collection_frequency.len(), model.vocab_size());
        assert_eq!(snapshot.idf["orbit"], 3f64.ln());
        // tf-idf stays sparse
        assert!(!snapshot.tf_idf["notes"].contains_key("algebra"));
        assert_eq!(snapshot.classification["algebra"].category, "mathematics");
        assert_eq!(snapshot.classification["notes"].category, "uncategorized");
        let names: Vec<&str> = snapshot.classification["notes"].scores.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["mathematics", "physics", "chemistry", "programming"]);
    }

    #[test]
    fn both_formats_round_trip_through_files() {
        let snapshot = model().snapshot();
        let dir = tempfile::tempdir().unwrap();
        for format in [ExportFormat::Json, ExportFormat::Cbor] {
            let path = dir.path().join(format!("metrics.{}", format.extension()));
            save_snapshot(&snapshot, &path, format).unwrap();
            assert_eq!(load_snapshot(&path, format).unwrap(), snapshot);
        }
    }

    #[test]
    fn cbor_is_more_compact_than_json() {
        let snapshot = model().snapshot();
        let (mut json, mut cbor) = (Vec::new(), Vec::new());
        JsonCodec.encode(&snapshot, &mut json).unwrap();
        CborCodec.encode(&snapshot, &mut cbor).unwrap();
        assert!(cbor.len() < json.len());
    }

    #[test]
    fn corrupt_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(load_snapshot(&path, ExportFormat::Json), Err(MetricsError::Json(_))));
        assert!(matches!(load_snapshot(&path, ExportFormat::Cbor), Err(MetricsError::Cbor(_))));
    }

    #[test]
    fn format_names() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("cbor".parse::<ExportFormat>().unwrap(), ExportFormat::Cbor);
        assert!(matches!("msgpack".parse::<ExportFormat>(), Err(MetricsError::UnknownFormat(_))));
    }
}
