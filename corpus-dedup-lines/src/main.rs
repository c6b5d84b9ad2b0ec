use clap::Parser;
use corpus_dedup::error::DedupError;
use corpus_dedup::report::make_report;
use corpus_dedup::util::init_tracing;
use corpus_dedup_lines::exact_line_deduplication;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Drop every line that occurs more than once across the input files.
#[derive(Parser, Debug)]
#[command(name = "corpus-dedup-lines", version)]
struct Args {
    /// Input files, processed in the given order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Existing directory that receives one output file per input
    #[arg(short, long)]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    make_report("lines", dedup(args)).emit()
}

fn dedup(args: Args) -> Result<Value, DedupError> {
    let start = std::time::Instant::now();
    let summary = exact_line_deduplication(&args.inputs, &args.output_dir)?;
    info!(
        "Line dedup completed in {:.4} secs",
        start.elapsed().as_secs_f64()
    );
    serde_json::to_value(summary).map_err(DedupError::io_error)
}
