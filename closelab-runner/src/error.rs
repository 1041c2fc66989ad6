//! Error types for file-level operations.

use std::io;
use std::path::{Path, PathBuf};

use closelab_core::ParseError;
use thiserror::Error;

/// Failure while decoding or encoding a record stream.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from the pipeline operations.
///
/// Nothing is retried. A parse failure aborts the whole operation; an output
/// file that was already created may hold a partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("'{}': {source}", path.display())]
    Codec { path: PathBuf, source: CodecError },

    #[error("input and output are the same file: '{}'", path.display())]
    SamePath { path: PathBuf },

    #[error("invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("failed to write report: {0}")]
    Report(#[source] CodecError),
}

impl PipelineError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn codec(path: &Path, source: impl Into<CodecError>) -> Self {
        Self::Codec {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// The parse failure behind this error, if it is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Codec {
                source: CodecError::Parse(e),
                ..
            }
            | Self::Report(CodecError::Parse(e)) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = PipelineError::io(
            Path::new("missing.csv"),
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing.csv"), "{msg}");
        assert!(err.parse_error().is_none());
    }

    #[test]
    fn parse_error_is_reachable() {
        let err = PipelineError::codec(
            Path::new("in.csv"),
            ParseError::new(4, "ClosingPrice", "x", "invalid float literal"),
        );
        let parse = err.parse_error().unwrap();
        assert_eq!(parse.line, 4);
        assert!(err.to_string().contains("in.csv"));
        assert!(err.to_string().contains("line 4"));
    }
}
