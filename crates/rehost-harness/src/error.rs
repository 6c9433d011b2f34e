//! Harness errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("failed reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    #[error("{function}: bad input {field:?}: {reason}")]
    BadInput {
        function: String,
        field: String,
        reason: String,
    },
}

impl HarnessError {
    /// True when the fixture itself is malformed, as opposed to the
    /// environment failing.
    #[must_use]
    pub fn is_fixture_error(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}
