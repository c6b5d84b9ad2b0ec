//! Near-duplicate document removal with MinHash + LSH.
//!
//! Documents are normalized, split into word shingles and signed with
//! MinHash. Signatures are banded; documents that agree on a whole band become
//! candidate pairs, which are checked against their exact Jaccard similarity.
//! Verified pairs are merged with union-find and the lowest-indexed document
//! of every cluster is written out unchanged.

pub mod dedup;
pub mod lsh;
pub mod normalize;
pub mod util;

use corpus_dedup::dto::MinHashConfig;
use corpus_dedup::error::DedupError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::dedup::DeduplicationTable;
use crate::lsh::{MinHashLSH, Permutations};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyDedupSummary {
    pub documents: usize,
    pub candidate_pairs: usize,
    pub verified_pairs: usize,
    pub merges: usize,
    pub clusters: usize,
    pub outputs: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Keeps one document per near-duplicate cluster.
///
/// ## Arguments
///
/// * `input_files` - Documents, in order; order decides representatives.
/// * `config` - MinHash and LSH parameters.
/// * `output_directory` - Destination, created if missing.
pub fn minhash_deduplication<P: AsRef<Path>>(
    input_files: &[P],
    config: &MinHashConfig,
    output_directory: &Path,
) -> Result<FuzzyDedupSummary, DedupError> {
    minhash_deduplication_with_manifest(input_files, config, output_directory, None)
}

/// Same as [`minhash_deduplication`], also writing a `path,cluster_id` CSV to
/// `manifest` when given.
pub fn minhash_deduplication_with_manifest<P: AsRef<Path>>(
    input_files: &[P],
    config: &MinHashConfig,
    output_directory: &Path,
    manifest: Option<&Path>,
) -> Result<FuzzyDedupSummary, DedupError> {
    config.validate()?;
    let start = Instant::now();
    let permutations = Permutations::new(config.num_hashes, config.seed);
    let documents = util::load_documents(input_files, config, &permutations)?;
    info!(
        "Signed {} documents in {:.4} secs",
        documents.len(),
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let lsh = MinHashLSH::new(&documents, config.num_bands, config.rows_per_band());
    let dedup_table = DeduplicationTable::new(&documents, &lsh, config.jaccard_threshold);
    info!(
        "Verified {} of {} candidate pairs into {} clusters in {:.4} secs",
        dedup_table.verified_pairs(),
        dedup_table.candidate_pairs(),
        dedup_table.grouped_ids().len(),
        start.elapsed().as_secs_f64()
    );

    let outputs = util::write_representatives(&documents, &dedup_table, output_directory)?;
    if let Some(path) = manifest {
        util::write_cluster_manifest(path, &documents, &dedup_table)?;
    }
    Ok(FuzzyDedupSummary {
        documents: documents.len(),
        candidate_pairs: dedup_table.candidate_pairs(),
        verified_pairs: dedup_table.verified_pairs(),
        merges: dedup_table.merges(),
        clusters: dedup_table.grouped_ids().len(),
        outputs,
        manifest: manifest.map(Path::to_path_buf),
    })
}
