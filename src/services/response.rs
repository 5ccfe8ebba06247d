//! Response envelope returned by the task and user services.

use serde::Serialize;

use super::error::{ServiceError, ServiceResult};

/// Outcome of a service call in transport-neutral form.
///
/// Callers branch on `success` and map `error_code` to a transport status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Result value on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    /// Numeric error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
}

impl<T> ServiceResponse<T> {
    /// Builds a successful response.
    #[must_use]
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
            error_code: None,
        }
    }

    /// Builds a failed response with `code`.
    #[must_use]
    pub fn failure(message: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
            error_code: Some(code),
        }
    }

    /// Converts a service result, logging failures by severity.
    ///
    /// Client errors are logged at `warn`, internal failures at `error`.
    #[must_use]
    pub fn from_result(result: ServiceResult<T>, success_message: impl Into<String>) -> Self {
        match result {
            Ok(payload) => Self::ok(success_message, payload),
            Err(err) => Self::from_error(&err),
        }
    }

    /// Converts a service error into a failed response.
    #[must_use]
    pub fn from_error(err: &ServiceError) -> Self {
        err.log();
        Self::failure(err.to_string(), err.code())
    }

    /// Maps the payload, keeping status fields.
    #[must_use]
    pub fn map<V>(self, f: impl FnOnce(T) -> V) -> ServiceResponse<V> {
        ServiceResponse {
            success: self.success,
            message: self.message,
            payload: self.payload.map(f),
            error_code: self.error_code,
        }
    }

    /// Returns the payload of a successful response.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}
