//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ConsultationStatus;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Caller identity is missing or unreadable.
    Unauthorized,
    /// The caller does not own the resource.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A concurrent writer changed the resource first.
    Conflict,
    /// The user already holds an active consultation with the brand.
    DuplicateActiveConsultation,
    /// The consultation's current status does not permit the operation.
    InvalidTransition,
    /// A dependency (usually the database) is unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use consult_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("consultation 7 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use consult_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "brandId" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// The user already holds an active consultation with the brand.
    ///
    /// The message names the blocking consultation's status so clients can
    /// tell the user why the request was refused.
    ///
    /// # Examples
    /// ```
    /// use consult_backend::domain::{ConsultationStatus, Error, ErrorCode};
    ///
    /// let err = Error::duplicate_active_consultation(ConsultationStatus::Pending);
    /// assert_eq!(err.code(), ErrorCode::DuplicateActiveConsultation);
    /// assert!(err.message().contains("PENDING"));
    /// ```
    pub fn duplicate_active_consultation(current: ConsultationStatus) -> Self {
        Self::new(
            ErrorCode::DuplicateActiveConsultation,
            format!(
                "an active consultation with this brand already exists (status: {})",
                current.name()
            ),
        )
        .with_details(json!({ "currentStatus": current.name() }))
    }

    /// The consultation's status does not permit the requested operation.
    pub fn invalid_transition(current: ConsultationStatus, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransition, message)
            .with_details(json!({ "currentStatus": current.name() }))
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
