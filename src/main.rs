use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use corpus_metrics::{
    export::save_snapshot, Document, EngineConfig, ExportFormat, MetricsModel, Result, SortOrder, TermMetric,
};

/// Term statistics and keyword classification for a directory of text files
#[derive(Parser, Debug)]
#[command(name = "corpus-metrics", version, long_about = None)]
struct Cli {
    /// Directory holding the `*.txt` documents
    docs: PathBuf,

    /// Engine configuration (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a snapshot of every table to this path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Snapshot format: json or cbor
    #[arg(long, default_value = "json")]
    format: ExportFormat,

    /// Metric used for the term ranking: cf, df, idf or balanced
    #[arg(long, default_value = "balanced")]
    metric: TermMetric,

    /// Number of ranked terms to print
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Rank from the lowest value up
    #[arg(long)]
    ascending: bool,

    /// Also print the TF-IDF ranking of this document
    #[arg(long)]
    document: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let texts = load_documents(&cli.docs)?;
    let model: MetricsModel = MetricsModel::from_texts(texts, &config)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "analysis finished");

    if let Some(out) = &cli.out {
        save_snapshot(&model.snapshot(), out, cli.format)?;
    }

    let order = if cli.ascending { SortOrder::Ascending } else { SortOrder::Descending };
    println!("{}", model.summary());
    println!();
    println!("top {} terms by {}", cli.top, cli.metric);
    print!("{}", model.top_terms(cli.metric, cli.top, order));

    if let Some(doc) = &cli.document {
        println!();
        match model.document_tf_idf_ranking(doc, cli.top, order) {
            Some(ranking) => {
                println!("tf-idf of {doc}");
                print!("{ranking}");
            }
            None => warn!(document = %doc, "document not found"),
        }
    }

    println!();
    println!("categories");
    for (category, docs) in model.category_groups() {
        println!("{}\t{}\t{}", docs.len(), category, docs.join(", "));
    }
    Ok(())
}

/// Read every `*.txt` file directly inside `dir`, in parallel
/// Files are ordered by path so document order is reproducible.
fn load_documents(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")))
        .collect();
    files.sort();
    if files.is_empty() {
        warn!(dir = %dir.display(), "no .txt documents found");
    }
    debug!(files = files.len(), threads = rayon::current_num_threads(), "reading documents");

    files
        .par_iter()
        .map(|path| -> Result<(String, String)> {
            let text = fs::read_to_string(path)?;
            if text.trim().is_empty() {
                warn!(path = %path.display(), "empty document");
            }
            Ok((Document::id_from_path(path), text))
        })
        .collect()
}
