use crate::report::Status;
use serde::Serialize;
use std::error;
use std::fmt;
use std::path::Path;

#[derive(Debug, Serialize, Clone)]
pub struct DedupError {
    pub msg: String,
    pub status: Status,
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for DedupError {}

impl DedupError {
    pub fn invalid_config<T: fmt::Display>(msg: T) -> DedupError {
        DedupError {
            msg: msg.to_string(),
            status: Status::InvalidConfig,
        }
    }

    pub fn io_error<T: fmt::Display>(msg: T) -> DedupError {
        DedupError {
            msg: msg.to_string(),
            status: Status::IoError,
        }
    }

    /// I/O error prefixed with the path it happened on.
    pub fn at_path<T: fmt::Display>(path: &Path, err: T) -> DedupError {
        DedupError::io_error(format!("{}: {}", path.display(), err))
    }
}
