//! Fatal error conditions of the extraction pipeline.
//!
//! Per-file scan problems are not errors; they are reported as
//! [`ScanWarning`](crate::core::scanner::ScanWarning) and the run continues.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("source root does not exist or is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid header template: {0}")]
    HeaderTemplate(String),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
