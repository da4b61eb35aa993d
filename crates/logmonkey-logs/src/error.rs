use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, parsing or filtering log lines
#[derive(Error, Debug)]
pub enum LogError {
    /// The line passed the shape check but a delimiter scan came up empty
    #[error("malformed log line: {reason}")]
    MalformedLine { reason: String },

    #[error("cannot read {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tag filter '{0}'")]
    InvalidFilterSyntax(String),

    #[error("no input files given")]
    NoInputs,
}

impl LogError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            reason: reason.into(),
        }
    }
}
