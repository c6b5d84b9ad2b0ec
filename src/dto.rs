use crate::error::DedupError;
use crate::util::read_document;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the MinHash + LSH pipeline.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MinHashConfig {
    /// Signature length (number of hash permutations)
    pub num_hashes: usize,
    /// Number of LSH bands; `num_hashes / num_bands` rows each, remainder unused
    pub num_bands: usize,
    /// Words per shingle
    pub ngrams: usize,
    /// Inclusive Jaccard threshold a candidate pair must reach to be merged
    pub jaccard_threshold: f64,
    /// Seed for the permutation parameters
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            num_hashes: 128,
            num_bands: 16,
            ngrams: 5,
            jaccard_threshold: 0.8,
            seed: default_seed(),
        }
    }
}

impl MinHashConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, DedupError> {
        let raw = read_document(path)?;
        serde_json::from_str(&raw).map_err(|err| {
            DedupError::invalid_config(format!("{}: {}", path.display(), err))
        })
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.num_hashes == 0 {
            return Err(DedupError::invalid_config("numHashes must be > 0"));
        }
        if self.num_bands == 0 {
            return Err(DedupError::invalid_config("numBands must be > 0"));
        }
        if self.ngrams == 0 {
            return Err(DedupError::invalid_config("ngrams must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.jaccard_threshold) {
            return Err(DedupError::invalid_config(format!(
                "jaccardThreshold must be within [0, 1], got {}",
                self.jaccard_threshold
            )));
        }
        Ok(())
    }

    pub fn rows_per_band(&self) -> usize {
        self.num_hashes / self.num_bands
    }
}

/// One row of the cluster manifest.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ClusterAssignment {
    pub path: String,
    pub cluster_id: String,
}
