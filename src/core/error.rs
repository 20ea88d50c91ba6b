//! Typed error handling for the API
//!
//! Every handler returns [`ApiResult`]; the single [`IntoResponse`] impl for
//! [`ApiError`] maps each kind to its status code and JSON body, so handlers
//! never build error responses by hand.
//!
//! # Error Categories
//!
//! - [`ApiError::NotFound`]: the addressed record does not exist (404)
//! - [`ValidationError`]: malformed input or violated constraints (400)
//! - [`ApiError::Unauthorized`] / [`ApiError::Forbidden`]: auth failures
//! - [`UpstreamError`]: an outbound collaborator failed (500)
//! - [`ApiError::Internal`]: anything else (500, details only in the log)
//!
//! # Example
//!
//! ```rust,ignore
//! use devcamper::prelude::*;
//!
//! async fn load(service: &impl DataService<Bootcamp>, id: Uuid) -> ApiResult<Bootcamp> {
//!     service
//!         .get(&id)
//!         .await?
//!         .ok_or_else(|| ApiError::not_found("Bootcamp", id))
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The error type returned by every handler and service call
#[derive(Debug)]
pub enum ApiError {
    /// No record of the given resource exists with this id
    NotFound { resource: String, id: String },

    /// A lookup by something other than id found nothing
    NoMatch { message: String },

    /// Input rejected before or during a store operation
    Validation(ValidationError),

    /// Missing, malformed, expired or unresolvable credential
    Unauthorized { message: String },

    /// Authenticated, but the role or ownership check failed
    Forbidden { message: String },

    /// An outbound collaborator (mailer, geocoder, blob writer) failed
    Upstream(UpstreamError),

    /// Unexpected failure; the message is logged, never sent to the client
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn no_match(message: impl Into<String>) -> Self {
        ApiError::NoMatch {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
        }
    }

    /// A 400 with a caller-facing message
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Validation(ValidationError::Rejected {
            message: message.into(),
        })
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { resource, id } => {
                write!(f, "{} not found with id of {}", resource, id)
            }
            ApiError::NoMatch { message } => write!(f, "{}", message),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Unauthorized { message } => write!(f, "{}", message),
            ApiError::Forbidden { message } => write!(f, "{}", message),
            ApiError::Upstream(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Validation(e) => Some(e),
            ApiError::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

/// Error body sent to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`, mirrors the success envelope
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::NoMatch { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } | ApiError::NoMatch { .. } => "NOT_FOUND",
            ApiError::Validation(e) => e.error_code(),
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Upstream(_) => "UPSTREAM_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::Internal(_) => "Server Error".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            success: false,
            error,
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id
            })),
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ApiError::Validation(ValidationError::DuplicateKey { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            ApiError::Validation(ValidationError::UnknownField { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(msg) => tracing::error!(error = %msg, "internal error"),
            ApiError::Upstream(e) => {
                tracing::error!(service = e.service, error = %e.detail, "upstream failure")
            }
            _ => {}
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors caused by client input
#[derive(Debug)]
pub enum ValidationError {
    /// A unique index already holds this value
    DuplicateKey { field: String },

    /// A required field was missing or empty
    RequiredField { field: String },

    /// Several field-level constraint failures
    FieldErrors(Vec<FieldValidationError>),

    /// A query or body referenced a field that is not allowed
    UnknownField { field: String },

    /// A value could not be parsed for its field
    InvalidValue { field: String, message: String },

    /// A non-admin user tried to create a second bootcamp
    AlreadyPublished { user_id: String },

    /// Request body was not valid JSON for the target type
    InvalidJson { message: String },

    /// Free-form rejection with a caller-facing message
    Rejected { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateKey { field } => {
                write!(f, "Duplicate field value entered for {}", field)
            }
            ValidationError::RequiredField { field } => {
                write!(f, "Please add a {}", field)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "{}", msgs.join(", "))
            }
            ValidationError::UnknownField { field } => {
                write!(f, "Unknown field '{}'", field)
            }
            ValidationError::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
            ValidationError::AlreadyPublished { user_id } => {
                write!(
                    f,
                    "User with the ID {} has already published a bootcamp",
                    user_id
                )
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::Rejected { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::DuplicateKey { .. } => "DUPLICATE_KEY",
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::UnknownField { .. } => "UNKNOWN_FIELD",
            ValidationError::InvalidValue { .. } => "INVALID_VALUE",
            ValidationError::AlreadyPublished { .. } => "ALREADY_PUBLISHED",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::Rejected { .. } => "BAD_REQUEST",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

// =============================================================================
// Upstream Errors
// =============================================================================

/// Failure of an outbound collaborator
///
/// `message` is what the client sees; `detail` is only logged.
#[derive(Debug)]
pub struct UpstreamError {
    pub service: &'static str,
    pub message: String,
    pub detail: String,
}

impl UpstreamError {
    pub fn new(service: &'static str, message: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            service,
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UpstreamError {}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(ValidationError::FieldErrors(fields))
    }
}

/// A specialized Result type for handlers and services
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Tests
// =============================================================================
