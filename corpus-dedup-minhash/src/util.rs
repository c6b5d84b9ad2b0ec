use crate::dedup::DeduplicationTable;
use crate::lsh::{Document, Permutations};
use corpus_dedup::dto::{ClusterAssignment, MinHashConfig};
use corpus_dedup::error::DedupError;
use corpus_dedup::util::{create_directory, output_path, read_document, write_document};
use csv::WriterBuilder;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reads every input in order, then normalizes, shingles and signs them in
/// parallel. Any unreadable file aborts the load.
pub fn load_documents<P: AsRef<Path>>(
    input_files: &[P],
    config: &MinHashConfig,
    permutations: &Permutations,
) -> Result<Vec<Document>, DedupError> {
    let texts = input_files
        .iter()
        .map(|path| {
            let path = path.as_ref();
            read_document(path).map(|text| (path.to_path_buf(), text))
        })
        .collect::<Result<Vec<(PathBuf, String)>, DedupError>>()?;
    Ok(texts
        .into_par_iter()
        .enumerate()
        .map(|(index, (path, text))| Document::new(index, path, text, config, permutations))
        .collect())
}

/// Writes the original text of each cluster representative to
/// `output_directory/<basename>`, creating the directory if needed.
pub fn write_representatives(
    documents: &[Document],
    dedup_table: &DeduplicationTable,
    output_directory: &Path,
) -> Result<Vec<PathBuf>, DedupError> {
    create_directory(output_directory)?;
    let mut written = FxHashSet::default();
    let mut outputs = Vec::new();
    for idx in dedup_table.representatives() {
        let document = &documents[idx];
        let output = output_path(output_directory, &document.path)?;
        if !written.insert(output.clone()) {
            warn!(
                "{} shares its basename with an earlier representative and replaces it",
                document.path.display()
            );
        }
        write_document(&output, document.text.as_bytes())?;
        outputs.push(output);
    }
    Ok(outputs)
}

/// Headerless `path,cluster_id` CSV with one row per document.
pub fn write_cluster_manifest(
    path: &Path,
    documents: &[Document],
    dedup_table: &DeduplicationTable,
) -> Result<(), DedupError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| DedupError::at_path(path, err))?;
    for (idx, cluster_id) in dedup_table.assignments() {
        let row = ClusterAssignment {
            path: documents[idx].path.display().to_string(),
            cluster_id,
        };
        writer
            .serialize(row)
            .map_err(|err| DedupError::at_path(path, err))?;
    }
    writer.flush().map_err(|err| DedupError::at_path(path, err))
}
