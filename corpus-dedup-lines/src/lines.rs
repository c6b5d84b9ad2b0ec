use corpus_dedup::error::DedupError;
use corpus_dedup::util::{output_path, require_directory, same_file};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

///
/// Global occurrence count of every distinct line, keyed by the line's raw
/// bytes including its terminator.
///
#[derive(Debug, Default)]
pub struct LineCounts {
    counts: FxHashMap<Vec<u8>, usize>,
}

impl LineCounts {
    ///
    /// Counting pass over every input file. Must complete before any output
    /// decision is made, since a line's fate depends on later files too.
    ///
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DedupError> {
        let mut line_counts = Self::default();
        for path in paths {
            line_counts.add_file(path.as_ref())?;
        }
        Ok(line_counts)
    }

    fn add_file(&mut self, path: &Path) -> Result<(), DedupError> {
        for_each_line(path, |line| {
            match self.counts.get_mut(line) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(line.to_vec(), 1);
                }
            }
            Ok(())
        })
    }

    pub fn count(&self, line: &[u8]) -> usize {
        self.counts.get(line).copied().unwrap_or(0)
    }

    pub fn is_unique(&self, line: &[u8]) -> bool {
        self.count(line) == 1
    }

    pub fn distinct_lines(&self) -> usize {
        self.counts.len()
    }
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExactDedupSummary {
    pub files: usize,
    pub distinct_lines: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
    pub outputs: Vec<PathBuf>,
}

///
/// Writes each input to `output_directory/<basename>`, keeping only lines
/// that occur exactly once across all inputs. Surviving lines keep their
/// relative order.
///
/// ## Arguments
///
/// * `input_files` - Files to deduplicate, in order.
/// * `output_directory` - Destination; must already exist.
///
pub fn exact_line_deduplication<P: AsRef<Path>>(
    input_files: &[P],
    output_directory: &Path,
) -> Result<ExactDedupSummary, DedupError> {
    require_directory(output_directory)?;
    let outputs = plan_outputs(input_files, output_directory)?;

    let line_counts = LineCounts::from_files(input_files)?;
    info!(
        "Counted {} distinct lines across {} files",
        line_counts.distinct_lines(),
        input_files.len()
    );

    let mut summary = ExactDedupSummary {
        files: input_files.len(),
        distinct_lines: line_counts.distinct_lines(),
        ..Default::default()
    };
    for (input, output) in input_files.iter().zip(outputs) {
        let (kept, dropped) = filter_file(input.as_ref(), &output, &line_counts)?;
        debug!("{}: kept {} lines, dropped {}", output.display(), kept, dropped);
        summary.lines_kept += kept;
        summary.lines_dropped += dropped;
        summary.outputs.push(output);
    }
    Ok(summary)
}

fn plan_outputs<P: AsRef<Path>>(
    input_files: &[P],
    output_directory: &Path,
) -> Result<Vec<PathBuf>, DedupError> {
    let mut seen = FxHashSet::default();
    let mut outputs = Vec::with_capacity(input_files.len());
    for input in input_files {
        let input = input.as_ref();
        let output = output_path(output_directory, input)?;
        if input_files.iter().any(|other| same_file(other.as_ref(), &output)) {
            return Err(DedupError::invalid_config(format!(
                "output {} would overwrite an input file",
                output.display()
            )));
        }
        if !seen.insert(output.clone()) {
            warn!(
                "{} shares its basename with an earlier input; its output replaces the earlier one",
                input.display()
            );
        }
        outputs.push(output);
    }
    Ok(outputs)
}

/// Second pass over one file. Returns `(kept, dropped)` line counts.
fn filter_file(
    input: &Path,
    output: &Path,
    line_counts: &LineCounts,
) -> Result<(usize, usize), DedupError> {
    let file = File::create(output).map_err(|err| DedupError::at_path(output, err))?;
    let mut writer = BufWriter::new(file);
    let (mut kept, mut dropped) = (0, 0);
    for_each_line(input, |line| {
        if line_counts.is_unique(line) {
            kept += 1;
            writer
                .write_all(line)
                .map_err(|err| DedupError::at_path(output, err))
        } else {
            dropped += 1;
            Ok(())
        }
    })?;
    writer
        .flush()
        .map_err(|err| DedupError::at_path(output, err))?;
    Ok((kept, dropped))
}

/// Calls `f` with every line of `path`, terminator included.
fn for_each_line<F>(path: &Path, mut f: F) -> Result<(), DedupError>
where
    F: FnMut(&[u8]) -> Result<(), DedupError>,
{
    let file = File::open(path).map_err(|err| DedupError::at_path(path, err))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|err| DedupError::at_path(path, err))?;
        if read == 0 {
            return Ok(());
        }
        f(&line)?;
    }
}
