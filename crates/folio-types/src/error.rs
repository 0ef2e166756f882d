use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed object identity: {0:?}")]
    MalformedIdentity(String),

    #[error("invalid object number: {0}")]
    InvalidNumber(String),

    #[error("invalid generation: {0}")]
    InvalidGeneration(String),
}
