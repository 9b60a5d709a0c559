//! Error types for sieve-purge

use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use std::path::PathBuf;
use thiserror::Error;

/// Fatal scanning errors.
///
/// Any of these aborts the scan: a partial usage set is not safe to purge
/// against.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid content pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid extractor pattern `{pattern}`: {message}")]
    InvalidExtractor { pattern: String, message: String },

    #[error("failed to read {}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Convert into a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            ScanError::InvalidPattern { pattern, message } => {
                DiagnosticMessageBuilder::error("Invalid content pattern")
                    .with_code("S-2-3")
                    .problem(format!("`{}` is not a valid glob pattern", pattern))
                    .add_detail(message.clone())
                    .build()
            }
            ScanError::InvalidExtractor { pattern, message } => {
                DiagnosticMessageBuilder::error("Invalid extractor pattern")
                    .with_code("S-2-4")
                    .problem(format!("`{}` is not a valid regular expression", pattern))
                    .add_detail(message.clone())
                    .build()
            }
            ScanError::DocumentRead { path, source } => {
                DiagnosticMessageBuilder::error("Document read error")
                    .with_code("S-2-1")
                    .problem("Every matched document must be readable before anything is purged")
                    .add_detail(source.to_string())
                    .add_hint("Check the file's permissions, or narrow the content patterns?")
                    .with_location(path.display().to_string())
                    .build()
            }
        }
    }
}
