//! Exact line deduplication across a set of text files.
//!
//! A line survives only if it occurs exactly once in the whole corpus; every
//! copy of a repeated line is dropped, including the first.

pub mod lines;

pub use lines::{exact_line_deduplication, ExactDedupSummary, LineCounts};
