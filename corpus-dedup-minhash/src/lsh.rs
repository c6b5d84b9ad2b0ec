use corpus_dedup::dto::MinHashConfig;
use rand::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::normalize::normalize;

pub type Shingles = FxHashSet<String>;

/// Space-joined runs of `ngrams` consecutive tokens. Empty when the text has
/// fewer than `ngrams` tokens.
pub fn shingles(normalized: &str, ngrams: usize) -> Shingles {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if ngrams == 0 || tokens.len() < ngrams {
        return Shingles::default();
    }
    tokens.windows(ngrams).map(|window| window.join(" ")).collect()
}

/// Affine permutation parameters `(a, b)`, one pair per hash function.
#[derive(Clone, Debug)]
pub struct Permutations(Vec<(u64, u64)>);

impl Permutations {
    /// The same `seed` yields the same permutation for every hash index.
    pub fn new(num_hashes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Permutations((0..num_hashes).map(|_| (rng.gen(), rng.gen())).collect())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinHash {
    pub hash_values: Vec<u32>,
}

impl MinHash {
    /// Value of every position when there is nothing to hash.
    pub const SENTINEL: u32 = u32::MAX;

    pub fn new<'s, I>(items: I, permutations: &Permutations) -> Self
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut hash_values = vec![Self::SENTINEL; permutations.len()];
        for item in items {
            let item_hash = calculate_hash(&item);
            for (i, &(a, b)) in permutations.0.iter().enumerate() {
                let hash = permute_hash(item_hash, a, b);
                hash_values[i] = hash_values[i].min(hash);
            }
        }
        MinHash { hash_values }
    }

    /// Fraction of positions that agree; estimates the Jaccard index of the
    /// underlying sets.
    pub fn estimated_similarity(&self, other: &MinHash) -> f64 {
        if self.hash_values.is_empty() {
            return 0.0;
        }
        let equal_count = self
            .hash_values
            .iter()
            .zip(&other.hash_values)
            .filter(|&(&a, &b)| a == b)
            .count();
        equal_count as f64 / self.hash_values.len() as f64
    }
}

/// One input document as it moves through the pipeline.
#[derive(Clone, Debug)]
pub struct Document {
    pub index: usize,
    pub path: PathBuf,
    pub text: String,
    pub normalized: String,
    pub shingles: Shingles,
    pub signature: MinHash,
}

impl Document {
    pub fn new(
        index: usize,
        path: PathBuf,
        text: String,
        config: &MinHashConfig,
        permutations: &Permutations,
    ) -> Self {
        let normalized = normalize(&text);
        let shingles = shingles(&normalized, config.ngrams);
        let signature = MinHash::new(shingles.iter().map(String::as_str), permutations);
        Document {
            index,
            path,
            text,
            normalized,
            shingles,
            signature,
        }
    }
}

/// Banded buckets over the signatures of a document set.
pub struct MinHashLSH<'a> {
    /// Signature positions per band
    rows_per_band: usize,
    /// One table per band, keyed by the exact band values
    hash_tables: Vec<FxHashMap<&'a [u32], Vec<usize>>>,
}

impl<'a> MinHashLSH<'a> {
    /// Buckets every document.
    ///
    /// ## Arguments
    ///
    /// * `documents` - Documents to bucket; `index` identifies each one.
    /// * `num_bands` - Number of band tables.
    /// * `rows_per_band` - Positions per band. Positions past
    ///   `num_bands * rows_per_band` are never looked at.
    pub fn new(documents: &'a [Document], num_bands: usize, rows_per_band: usize) -> Self {
        let mut hash_tables: Vec<FxHashMap<&'a [u32], Vec<usize>>> =
            vec![FxHashMap::default(); num_bands];
        for document in documents {
            for (i, table) in hash_tables.iter_mut().enumerate() {
                let start = i * rows_per_band;
                let end = start + rows_per_band;
                let band = &document.signature.hash_values[start..end];
                table.entry(band).or_default().push(document.index);
            }
        }
        MinHashLSH {
            rows_per_band,
            hash_tables,
        }
    }

    pub fn num_bands(&self) -> usize {
        self.hash_tables.len()
    }

    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Documents in the bucket of `band` keyed by `values`.
    #[cfg(test)]
    pub fn bucket(&self, band: usize, values: &[u32]) -> &[usize] {
        self.hash_tables
            .get(band)
            .and_then(|table| table.get(values))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every `(lower, higher)` index pair sharing at least one bucket,
    /// deduplicated across bands and sorted.
    ///
    /// A bucket of k documents contributes k * (k - 1) / 2 pairs.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: FxHashSet<(usize, usize)> = FxHashSet::default();
        for docs in self.hash_tables.iter().flat_map(|table| table.values()) {
            for (i, &a) in docs.iter().enumerate() {
                for &b in &docs[i + 1..] {
                    pairs.insert((a.min(b), a.max(b)));
                }
            }
        }
        let mut pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

#[inline]
fn calculate_hash<T: Hash>(t: &T) -> u64 {
    let mut s = FxHasher::default();
    t.hash(&mut s);
    s.finish()
}

#[inline]
fn permute_hash(hash: u64, a: u64, b: u64) -> u32 {
    ((a.wrapping_mul(hash).wrapping_add(b)) >> 32) as u32
}
