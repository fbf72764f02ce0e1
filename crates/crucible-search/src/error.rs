//! Search error types

use crucible_core::limits::ValidationError;
use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search-specific error types
///
/// A search that finds nothing is not an error; it yields an empty outcome.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Search task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),
}
