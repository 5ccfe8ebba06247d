//! Error types for domain validation and parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or patching domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The email address does not look like `local@domain.tld`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The comment content is empty after trimming.
    #[error("comment content must not be empty")]
    EmptyCommentContent,

    /// The attachment file name is empty after trimming.
    #[error("attachment file name must not be empty")]
    EmptyFileName,

    /// A date range whose start lies after its end.
    #[error("start date {start} must not be after end date {end}")]
    InvalidDateRange {
        /// Requested range start.
        start: DateTime<Utc>,
        /// Requested range end.
        end: DateTime<Utc>,
    },
}

/// Error returned while parsing a stored enum value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    /// Name of the value kind being parsed, such as `task status`.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
