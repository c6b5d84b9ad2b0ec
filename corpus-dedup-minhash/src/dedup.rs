use crate::lsh::{Document, MinHashLSH, Shingles};
use rayon::prelude::*;
use tracing::debug;

/// Exact Jaccard index of two shingle sets. Two empty sets count as identical.
pub fn jaccard_similarity(a: &Shingles, b: &Shingles) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = smaller.iter().filter(|s| larger.contains(*s)).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

///
/// Union-find over document indices, backed by a parent array.
///
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    /// Canonical root of `x`'s set, halving the path on the way up.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        self.parent[root_b] = root_a;
        true
    }

    /// Every set, members ascending, sets ordered by their smallest member.
    pub fn clusters(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.parent.len()];
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            match slot_of_root[root] {
                Some(slot) => clusters[slot].push(x),
                None => {
                    slot_of_root[root] = Some(clusters.len());
                    clusters.push(vec![x]);
                }
            }
        }
        clusters
    }
}

///
/// Near-duplicate clusters of a document set, built from LSH candidates that
/// pass exact Jaccard verification.
///
#[derive(Debug)]
pub struct DeduplicationTable {
    /// Clusters ordered by representative; members ascending
    clusters: Vec<Vec<usize>>,
    candidate_pairs: usize,
    verified_pairs: usize,
    /// Verified pairs that joined two previously separate clusters
    merges: usize,
}

impl DeduplicationTable {
    ///
    /// Verifies every candidate pair from `lsh` and clusters the survivors.
    ///
    /// ## Arguments
    ///
    /// * `documents` - The bucketed documents, `documents[i].index == i`.
    /// * `lsh` - Buckets built over `documents`.
    /// * `threshold` - Inclusive Jaccard threshold for merging a pair.
    ///
    pub fn new(documents: &[Document], lsh: &MinHashLSH, threshold: f64) -> Self {
        let candidates = lsh.candidate_pairs();
        let verified: Vec<(usize, usize)> = candidates
            .par_iter()
            .copied()
            .filter(|&(a, b)| {
                jaccard_similarity(&documents[a].shingles, &documents[b].shingles) >= threshold
            })
            .collect();
        for &(a, b) in &verified {
            debug!(
                "{} ~ {} (estimated similarity {:.3})",
                documents[a].path.display(),
                documents[b].path.display(),
                documents[a]
                    .signature
                    .estimated_similarity(&documents[b].signature)
            );
        }
        let mut table = Self::from_verified_pairs(documents.len(), &verified);
        table.candidate_pairs = candidates.len();
        table
    }

    /// Clusters `len` documents given pairs already known to be similar.
    pub fn from_verified_pairs(len: usize, pairs: &[(usize, usize)]) -> Self {
        let mut sets = DisjointSet::new(len);
        let merges = pairs
            .iter()
            .filter(|&&(a, b)| sets.union(a, b))
            .count();
        Self {
            clusters: sets.clusters(),
            candidate_pairs: pairs.len(),
            verified_pairs: pairs.len(),
            merges,
        }
    }

    pub fn grouped_ids(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Lowest index of every cluster, ascending.
    pub fn representatives(&self) -> Vec<usize> {
        self.clusters.iter().map(|cluster| cluster[0]).collect()
    }

    /// `(document index, cluster id)` for every document, where the id is
    /// `"{cluster ordinal}-{cluster size}"`.
    pub fn assignments(&self) -> Vec<(usize, String)> {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(idx, group)| {
                let cluster_id = format!("{idx}-{}", group.len());
                group.iter().map(move |&id| (id, cluster_id.clone()))
            })
            .collect()
    }

    pub fn candidate_pairs(&self) -> usize {
        self.candidate_pairs
    }

    pub fn verified_pairs(&self) -> usize {
        self.verified_pairs
    }

    pub fn merges(&self) -> usize {
        self.merges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsh::{shingles, Permutations};
    use corpus_dedup::dto::MinHashConfig;
    use std::path::PathBuf;

    fn set(words: &[&str]) -> Shingles {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn jaccard_of_overlapping_sets() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.5);
        assert_eq!(jaccard_similarity(&b, &a), 0.5);
        assert_eq!(jaccard_similarity(&a, &a), 1.0);
    }

    #[test]
    fn jaccard_of_empty_sets() {
        let empty = Shingles::default();
        assert_eq!(jaccard_similarity(&empty, &empty), 1.0);
        assert_eq!(jaccard_similarity(&empty, &set(&["a"])), 0.0);
        assert_eq!(jaccard_similarity(&set(&["a"]), &empty), 0.0);
    }

    #[test]
    fn find_is_idempotent() {
        let mut sets = DisjointSet::new(5);
        sets.union(3, 4);
        sets.union(4, 1);
        let root = sets.find(1);
        assert_eq!(sets.find(root), root);
        assert_eq!(sets.find(3), root);
        assert_eq!(sets.find(4), root);
        assert_ne!(sets.find(0), root);
    }

    #[test]
    fn union_reports_merges() {
        let mut sets = DisjointSet::new(3);
        assert!(sets.union(0, 1));
        assert!(!sets.union(1, 0));
        assert!(sets.union(2, 1));
    }

    #[test]
    fn clusters_do_not_depend_on_union_order() {
        let pairs = [(0, 3), (3, 5), (1, 2), (6, 5)];
        let mut forward = DisjointSet::new(7);
        let mut backward = DisjointSet::new(7);
        for &(a, b) in &pairs {
            forward.union(a, b);
        }
        for &(a, b) in pairs.iter().rev() {
            backward.union(b, a);
        }
        let expected = vec![vec![0, 3, 5, 6], vec![1, 2], vec![4]];
        assert_eq!(forward.clusters(), expected);
        assert_eq!(backward.clusters(), expected);
    }

    #[test]
    fn table_picks_lowest_index_per_cluster() {
        let table = DeduplicationTable::from_verified_pairs(5, &[(4, 2), (1, 3)]);
        assert_eq!(table.representatives(), vec![0, 1, 2]);
        assert_eq!(table.grouped_ids(), &[vec![0], vec![1, 3], vec![2, 4]]);
        assert_eq!(
            table.assignments(),
            vec![
                (0, "0-1".to_string()),
                (1, "1-2".to_string()),
                (3, "1-2".to_string()),
                (2, "2-2".to_string()),
                (4, "2-2".to_string()),
            ]
        );
    }

    fn documents(texts: &[&str], config: &MinHashConfig) -> Vec<Document> {
        let permutations = Permutations::new(config.num_hashes, config.seed);
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Document::new(
                    i,
                    PathBuf::from(format!("{i}.txt")),
                    text.to_string(),
                    config,
                    &permutations,
                )
            })
            .collect()
    }

    #[test]
    fn clustering_is_transitive() {
        // Neighbours share 3 of 5 distinct words; A and C share only 2 of 6.
        let a = "w1 w2 w3 w4";
        let b = "w2 w3 w4 w5";
        let c = "w3 w4 w5 w6";
        assert_eq!(jaccard_similarity(&shingles(a, 1), &shingles(b, 1)), 0.6);
        assert!(jaccard_similarity(&shingles(a, 1), &shingles(c, 1)) < 0.6);

        let table = DeduplicationTable::from_verified_pairs(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(table.grouped_ids(), &[vec![0, 1, 2]]);
        assert_eq!(table.verified_pairs(), 3);
        assert_eq!(table.merges(), 2);
        assert_eq!(table.representatives(), vec![0]);
    }

    #[test]
    fn candidates_below_threshold_stay_apart() {
        // One band over everything: every pair becomes a candidate.
        let config = MinHashConfig {
            num_hashes: 4,
            num_bands: 8,
            ngrams: 1,
            jaccard_threshold: 0.5,
            seed: 42,
        };
        let docs = documents(&["a b c d", "a b c e", "x y z w"], &config);
        let lsh = MinHashLSH::new(&docs, config.num_bands, config.rows_per_band());

        let table = DeduplicationTable::new(&docs, &lsh, config.jaccard_threshold);

        assert_eq!(table.candidate_pairs(), 3);
        assert_eq!(table.verified_pairs(), 1);
        assert_eq!(table.grouped_ids(), &[vec![0, 1], vec![2]]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let config = MinHashConfig {
            num_hashes: 4,
            num_bands: 8,
            ngrams: 1,
            jaccard_threshold: 0.6,
            seed: 42,
        };
        let docs = documents(&["w1 w2 w3 w4", "w2 w3 w4 w5"], &config);
        let lsh = MinHashLSH::new(&docs, config.num_bands, config.rows_per_band());

        let table = DeduplicationTable::new(&docs, &lsh, config.jaccard_threshold);

        assert_eq!(table.representatives(), vec![0]);
    }

    #[test]
    fn disjoint_documents_never_merge() {
        let config = MinHashConfig {
            num_hashes: 4,
            num_bands: 8,
            ngrams: 1,
            jaccard_threshold: 0.01,
            seed: 42,
        };
        let docs = documents(&["red green", "blue yellow"], &config);
        let lsh = MinHashLSH::new(&docs, config.num_bands, config.rows_per_band());

        let table = DeduplicationTable::new(&docs, &lsh, config.jaccard_threshold);

        assert_eq!(table.representatives(), vec![0, 1]);
    }
}
