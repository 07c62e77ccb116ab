use thiserror::Error;

use mosaic_db::InvalidField;

/// Failures a concept or composition reports to its caller.
#[derive(Debug, Error)]
pub enum ConceptError {
    /// The record, or a record it refers to, does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique field already holds this value.
    #[error("{0}")]
    Conflict(String),

    /// A required input was missing or unusable.
    #[error("{0}")]
    BadValues(String),

    #[error("Invalid invitation key!")]
    InvalidInvitation,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    /// Authenticated, but not allowed to touch this record.
    #[error("{0}")]
    Forbidden(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type ConceptResult<T> = Result<T, ConceptError>;

impl From<InvalidField> for ConceptError {
    fn from(err: InvalidField) -> Self {
        ConceptError::BadValues(err.to_string())
    }
}
