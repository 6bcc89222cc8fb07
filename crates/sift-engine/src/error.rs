use sift_query::QueryParseError;

use crate::path::PathError;

/// Query-shape errors, reported once when a query or pipeline is compiled.
///
/// Data-shape variance (missing fields, wrong types) is never an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: PathError,
    },
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Parse(#[from] QueryParseError),
}

impl EngineError {
    pub(crate) fn path(path: &str, source: PathError) -> Self {
        EngineError::InvalidPath {
            path: path.to_string(),
            source,
        }
    }
}
