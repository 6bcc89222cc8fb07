/// Parse error for query, sort and projection documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("query parse error: {0}")]
pub struct QueryParseError(pub String);

impl QueryParseError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
