use hangout_db::error::DbError;
use thiserror::Error;

use crate::notify::NotifyError;
use crate::places::PlacesError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] hangout_core::error::CoreError),

    #[error(transparent)]
    NotifyError(#[from] NotifyError),

    #[error(transparent)]
    PlacesError(#[from] PlacesError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Caller-facing classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    /// Id collision or a second populate.
    DuplicateId,
    Validation,
    Forbidden,
    /// The store, the chat platform or the places service failed.
    CollaboratorFailure,
    Internal,
}

impl ServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        use hangout_core::error::CoreError;

        match self {
            Self::NotFound(_) | Self::DatabaseError(DbError::NotFound(_)) => ErrorKind::NotFound,
            Self::Conflict(_)
            | Self::DatabaseError(DbError::DuplicateId(_) | DbError::AlreadyPopulated(_)) => {
                ErrorKind::DuplicateId
            }
            Self::Forbidden(_) | Self::DatabaseError(DbError::NotCreator { .. }) => {
                ErrorKind::Forbidden
            }
            Self::ValidationError(_)
            | Self::CoreError(CoreError::ValidationError(_) | CoreError::InvalidInput(_))
            | Self::DatabaseError(DbError::CoreError(
                CoreError::ValidationError(_) | CoreError::InvalidInput(_),
            )) => ErrorKind::Validation,
            Self::DatabaseError(_) | Self::NotifyError(_) | Self::PlacesError(_) => {
                ErrorKind::CollaboratorFailure
            }
            Self::CoreError(_) | Self::InvariantViolation(_) => ErrorKind::Internal,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
