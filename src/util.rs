use crate::error::DedupError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn read_document(path: &Path) -> Result<String, DedupError> {
    fs::read_to_string(path).map_err(|err| DedupError::at_path(path, err))
}

pub fn write_document(path: &Path, contents: &[u8]) -> Result<(), DedupError> {
    fs::write(path, contents).map_err(|err| DedupError::at_path(path, err))
}

/// `output_dir/<basename of input>`.
pub fn output_path(output_dir: &Path, input: &Path) -> Result<PathBuf, DedupError> {
    let name = input
        .file_name()
        .ok_or_else(|| DedupError::io_error(format!("{}: no file name", input.display())))?;
    Ok(output_dir.join(name))
}

pub fn require_directory(path: &Path) -> Result<(), DedupError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(DedupError::at_path(path, "output directory does not exist"))
    }
}

pub fn create_directory(path: &Path) -> Result<(), DedupError> {
    fs::create_dir_all(path).map_err(|err| DedupError::at_path(path, err))
}

/// True when both paths resolve to the same existing file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_basename() {
        let path = output_path(Path::new("/out"), Path::new("/data/shard/a.txt")).unwrap();
        assert_eq!(path, PathBuf::from("/out/a.txt"));
    }

    #[test]
    fn output_path_needs_a_file_name() {
        assert!(output_path(Path::new("/out"), Path::new("/")).is_err());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_directory(dir.path()).is_ok());
        let err = require_directory(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.status, crate::report::Status::IoError);
    }

    #[test]
    fn same_file_sees_through_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        write_document(&file, b"x\n").unwrap();
        let detour = dir.path().join(".").join("a.txt");
        assert!(same_file(&file, &detour));
        assert!(!same_file(&file, &dir.path().join("b.txt")));
    }
}
