use clap::Parser;
use corpus_dedup::dto::MinHashConfig;
use corpus_dedup::error::DedupError;
use corpus_dedup::report::make_report;
use corpus_dedup::util::init_tracing;
use corpus_dedup_minhash::minhash_deduplication_with_manifest;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Keep one document per cluster of near-duplicates.
#[derive(Parser, Debug)]
#[command(name = "corpus-dedup-minhash", version)]
struct Args {
    /// Input documents; earlier files win within a cluster
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the kept documents, created if missing
    #[arg(short, long)]
    output_dir: PathBuf,

    /// JSON file with a camelCase MinHash config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    num_hashes: Option<usize>,

    #[arg(long)]
    num_bands: Option<usize>,

    /// Words per shingle
    #[arg(long)]
    ngrams: Option<usize>,

    /// Inclusive Jaccard threshold
    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Also write a `path,cluster_id` CSV here
    #[arg(long)]
    clusters: Option<PathBuf>,
}

impl Args {
    fn dedup_config(&self) -> Result<MinHashConfig, DedupError> {
        let mut config = match &self.config {
            Some(path) => MinHashConfig::from_json_file(path)?,
            None => MinHashConfig::default(),
        };
        if let Some(num_hashes) = self.num_hashes {
            config.num_hashes = num_hashes;
        }
        if let Some(num_bands) = self.num_bands {
            config.num_bands = num_bands;
        }
        if let Some(ngrams) = self.ngrams {
            config.ngrams = ngrams;
        }
        if let Some(threshold) = self.threshold {
            config.jaccard_threshold = threshold;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    make_report("minhash", dedup(args)).emit()
}

fn dedup(args: Args) -> Result<Value, DedupError> {
    let start = std::time::Instant::now();
    let config = args.dedup_config()?;
    config.validate()?;
    info!(
        "numHashes={} numBands={} rowsPerBand={} ngrams={} threshold={}",
        config.num_hashes,
        config.num_bands,
        config.rows_per_band(),
        config.ngrams,
        config.jaccard_threshold
    );
    let summary = minhash_deduplication_with_manifest(
        &args.inputs,
        &config,
        &args.output_dir,
        args.clusters.as_deref(),
    )?;
    info!(
        "Dedupe completed in {:.4} secs",
        start.elapsed().as_secs_f64()
    );
    serde_json::to_value(summary).map_err(DedupError::io_error)
}
