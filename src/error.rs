use thiserror::Error;

/// Errors surfaced by the service layer. Each variant carries a
/// human-readable message and maps to exactly one HTTP status in the API
/// layer; none are retried internally.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing input, e.g. empty comment text.
    #[error("{0}")]
    Validation(String),
    /// Duplicate like, unlike of a post that was never liked, taken email.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Ownership or role check failed.
    #[error("{0}")]
    Forbidden(String),
    /// Structurally invalid request such as following yourself.
    #[error("{0}")]
    InvalidOperation(String),
    /// Missing or bad credentials.
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Wraps self so it can travel through an `anyhow::Result` repository
    /// closure without losing the variant.
    pub fn into_anyhow(self) -> anyhow::Error {
        anyhow::Error::new(self)
    }

    /// Recovers a `DomainError` smuggled through `into_anyhow`; anything
    /// else really is an internal failure.
    pub fn from_db(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => domain,
            Err(other) => DomainError::Internal(other),
        }
    }
}
