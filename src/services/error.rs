//! Service error taxonomy and numeric result codes.

use std::fmt;
use thiserror::Error;

use super::cascade::CascadeError;
use crate::domain::DomainError;
use crate::ports::{RepositoryError, ScopeError, UnitOfWorkError};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Entity named in a not-found error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A user.
    User,
    /// A task.
    Task,
    /// A membership row.
    Member,
    /// A comment.
    Comment,
    /// An attachment.
    Attachment,
    /// An activity.
    Activity,
}

impl EntityKind {
    /// Returns the lowercase entity name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Task => "task",
            Self::Member => "member",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
            Self::Activity => "activity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error category mapped to a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist (404).
    NotFound,
    /// The request is malformed or violates an invariant (400).
    Validation,
    /// A uniqueness constraint would be violated (409).
    Conflict,
    /// Unexpected failure below the service layer (500).
    Internal,
}

impl ErrorKind {
    /// Returns the numeric code callers map to a transport status.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Returns `true` for errors caused by the request rather than the system.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

/// Errors returned by the domain services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced record does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Kind of the missing record.
        kind: EntityKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// The request violates a service-level rule.
    #[error("{0}")]
    Validation(String),

    /// An email or username is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Domain value validation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Transaction lifecycle failed.
    #[error(transparent)]
    Transaction(#[from] UnitOfWorkError),

    /// A cascade deletion stopped partway.
    #[error(transparent)]
    Cascade(#[from] CascadeError),
}

impl ServiceError {
    /// Builds a not-found error for `kind` and `id`.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Builds a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::Domain(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Repository(_) | Self::Transaction(_) | Self::Cascade(_) => ErrorKind::Internal,
        }
    }

    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.kind().code()
    }

    /// Logs the error at `warn` for client errors and at `error` otherwise.
    pub fn log(&self) {
        let code = self.code();
        if self.kind().is_client_error() {
            tracing::warn!(code, error = %self, "service request rejected");
        } else {
            tracing::error!(code, error = %self, "service request failed");
        }
    }
}

/// Failure logging applied where a service result leaves the service.
pub(crate) trait LogFailure {
    /// Logs the error, if any, and hands the result back unchanged.
    #[must_use]
    fn logged(self) -> Self;
}

impl<T> LogFailure for ServiceResult<T> {
    fn logged(self) -> Self {
        self.inspect_err(ServiceError::log)
    }
}

impl From<ScopeError<Self>> for ServiceError {
    fn from(err: ScopeError<Self>) -> Self {
        match err {
            ScopeError::Aborted(inner) => inner,
            ScopeError::Commit(commit) => Self::Transaction(commit),
        }
    }
}
