//! Store error types

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted domain id does not exist. Updates never create domains
    /// implicitly; seeding is the caller's job.
    #[error("unknown domain id: {0}")]
    DomainNotFound(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check whether this error is the unknown-id rejection
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DomainNotFound(_))
    }
}
