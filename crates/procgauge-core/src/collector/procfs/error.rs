use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a kernel stat reader produced no value this cycle.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The kernel text source could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source was read but the expected fields were absent or malformed.
    #[error("unexpected content in {}: {reason}", path.display())]
    ParseMismatch { path: PathBuf, reason: String },
    /// The inputs were valid but the derived value is undefined.
    #[error("degenerate computation: {reason}")]
    DegenerateComputation { reason: String },
}

impl ReadError {
    pub(crate) fn mismatch(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReadError::ParseMismatch {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        ReadError::DegenerateComputation {
            reason: reason.into(),
        }
    }

    /// Short label for logs and cycle reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ReadError::SourceUnavailable { .. } => "source_unavailable",
            ReadError::ParseMismatch { .. } => "parse_mismatch",
            ReadError::DegenerateComputation { .. } => "degenerate_computation",
        }
    }
}
