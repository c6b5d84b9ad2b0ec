//! Shared types for the corpus deduplication services.
//!
//! The two pipelines live in their own crates (`corpus-dedup-lines` for exact
//! line dedup, `corpus-dedup-minhash` for MinHash + LSH document dedup). This
//! crate holds what they have in common: configuration, errors, the JSON run
//! report and file helpers.

pub mod dto;
pub mod error;
pub mod report;
pub mod util;
