//! Errors raised while mapping transfer objects into domain values.

use thiserror::Error;

use crate::domain::{DomainError, ParseValueError};

/// A transfer object could not be mapped into the domain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// An enum field held an unknown value.
    #[error(transparent)]
    UnknownValue(#[from] ParseValueError),

    /// A field failed domain validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}
