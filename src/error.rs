use thiserror::Error;

/// Failures the document store can surface. Anything here is fatal for the
/// current request; the service never retries automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection file not found: {0}")]
    CollectionNotFound(std::path::PathBuf),

    #[error("failed to read collection data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed collection data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Request-level error taxonomy. Classification failures are absent on
/// purpose: they degrade to an unknown intent inside the pipeline instead
/// of aborting the request.
#[derive(Debug, Error)]
pub enum AskError {
    /// The query failed validation; no store or LLM access was attempted.
    #[error("invalid query: {0}")]
    Validation(String),

    /// The document store failed mid-request.
    #[error("document store unavailable: {0}")]
    Store(#[from] StoreError),

    /// An LLM collaborator failed or timed out after retrieval.
    #[error("upstream service error: {0}")]
    Upstream(String),
}
