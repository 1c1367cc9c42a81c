use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("You have already liked this quote")]
    AlreadyLiked,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn quote_not_found() -> Self {
        Self::NotFound("quote not found".into())
    }
}
