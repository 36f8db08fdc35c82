//! Storage port error shared by every repository.

use thiserror::Error;

/// Failure reported by a repository implementation.
///
/// Absence is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint owned by the store was violated.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// The store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
