//! Error types and HTTP response conversion
//!
//! Two layers. The store adapter returns [`StoreError`] — a closed set of
//! categorized failures with the operation that produced them. The gateway
//! [`Error`] wraps those plus handler-level failures, and its
//! `IntoResponse` impl is the total mapping onto the wire envelope
//! `{ok:false, code, message, status, corrId?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

use crate::ids;

// ============================================================================
// Structured store errors
// ============================================================================

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Minting or exchanging an access token
    Token,
    /// Reading a range
    Read,
    /// Reading several ranges in one round-trip
    BatchRead,
    /// Appending a row
    Append,
    /// Overwriting a row
    Update,
    /// The health probe
    Health,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Read => write!(f, "read"),
            Self::BatchRead => write!(f, "batch_read"),
            Self::Append => write!(f, "append"),
            Self::Update => write!(f, "update"),
            Self::Health => write!(f, "health"),
        }
    }
}

/// Category of store error. Closed set; the HTTP mapping in
/// [`Error::into_response`] is total over these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Credentials or spreadsheet id are missing
    NotConfigured,
    /// Upstream rejected our token (401)
    Unauthorized,
    /// Range or spreadsheet does not exist (404)
    NotFound,
    /// Upstream quota exhausted (429)
    RateLimited,
    /// 408/5xx or a network fault; retriable
    UpstreamTransient,
    /// Malformed range (400)
    BadRange,
    /// Token exchange rejected (4xx from the identity endpoint)
    AuthFailed,
    /// Anything else
    Internal,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not_configured"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::UpstreamTransient => write!(f, "upstream_transient"),
            Self::BadRange => write!(f, "bad_range"),
            Self::AuthFailed => write!(f, "auth_failed"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Structured store error with operation context.
///
/// `message` never contains the raw upstream body; `retries` and
/// `latency_ms` feed the adapter's structured error log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreError {
    pub operation: StoreOperation,
    pub kind: StoreErrorKind,
    pub message: String,
    pub retries: u32,
    pub latency_ms: u64,
}

impl StoreError {
    pub fn new(operation: StoreOperation, kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            retries: 0,
            latency_ms: 0,
        }
    }

    pub fn not_configured(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::NotConfigured, message)
    }

    pub fn transient(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::UpstreamTransient, message)
    }

    pub fn internal(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Internal, message)
    }

    pub fn with_attempts(mut self, retries: u32, latency_ms: u64) -> Self {
        self.retries = retries;
        self.latency_ms = latency_ms;
        self
    }

    /// Whether the adapter's backoff loop should try again.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, StoreErrorKind::UpstreamTransient)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// Wire error codes
// ============================================================================

/// The closed set of error codes that can appear in a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadInput,
    Unauthorized,
    Forbidden,
    NotFound,
    EventNotFound,
    ShortlinkNotFound,
    ShortlinkInvalidToken,
    ShortlinkInvalidUrl,
    NotConfigured,
    RateLimited,
    Timeout,
    Busy,
    Internal,
    ParseError,
    UpstreamTransient,
    AuthFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadInput => "BAD_INPUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::ShortlinkNotFound => "SHORTLINK_NOT_FOUND",
            Self::ShortlinkInvalidToken => "SHORTLINK_INVALID_TOKEN",
            Self::ShortlinkInvalidUrl => "SHORTLINK_INVALID_URL",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Timeout => "TIMEOUT",
            Self::Busy => "BUSY",
            Self::Internal => "INTERNAL",
            Self::ParseError => "PARSE_ERROR",
            Self::UpstreamTransient => "UPSTREAM_TRANSIENT",
            Self::AuthFailed => "AUTH_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Gateway error
// ============================================================================

/// Result type alias using the gateway error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Structured store error
    #[error("{0}")]
    Store(StoreError),

    /// Invalid request body or parameters
    #[error("Bad input: {0}")]
    BadInput(String),

    /// Rejected by the admin auth guard
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An event was not found by id or slug
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// A keyed write lock could not be acquired within its bounded wait
    #[error("Busy: {0}")]
    Busy(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub code: &'static str,
    pub message: String,
    pub status: u16,
    #[serde(rename = "corrId", skip_serializing_if = "Option::is_none")]
    pub corr_id: Option<String>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: code.as_str(),
            message: message.into(),
            status: status.as_u16(),
            corr_id: None,
        }
    }

    /// Attach a correlation id (every 500 carries one).
    pub fn with_corr_id(mut self, corr_id: impl Into<String>) -> Self {
        self.corr_id = Some(corr_id.into());
        self
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Build the 500 envelope: generic message, fresh correlation id, logged
/// with the detail that never reaches the response.
fn internal_body(detail: &str) -> ErrorBody {
    let corr_id = ids::correlation_id();
    tracing::error!(corr_id = %corr_id, "internal error: {}", detail);
    ErrorBody::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Internal,
        "Internal error",
    )
    .with_corr_id(corr_id)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match self {
            Error::Config(e) => internal_body(&format!("config: {e}")),

            Error::Store(ref e) => {
                tracing::error!(
                    r#type = "store",
                    operation = %e.operation,
                    code = %e.kind,
                    retries = e.retries,
                    latency_ms = e.latency_ms,
                    "store error: {}", e.message
                );
                match e.kind {
                    StoreErrorKind::NotConfigured => ErrorBody::new(
                        StatusCode::SERVICE_UNAVAILABLE,
                        ErrorCode::NotConfigured,
                        "Storage backend is not configured",
                    ),
                    StoreErrorKind::Unauthorized => ErrorBody::new(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Storage backend rejected our credentials",
                    ),
                    StoreErrorKind::NotFound => ErrorBody::new(
                        StatusCode::NOT_FOUND,
                        ErrorCode::NotFound,
                        "Requested range does not exist",
                    ),
                    StoreErrorKind::RateLimited => ErrorBody::new(
                        StatusCode::TOO_MANY_REQUESTS,
                        ErrorCode::RateLimited,
                        "Storage backend rate limit exceeded",
                    ),
                    StoreErrorKind::UpstreamTransient
                    | StoreErrorKind::BadRange
                    | StoreErrorKind::AuthFailed
                    | StoreErrorKind::Internal => internal_body(&e.to_string()),
                }
            }

            Error::BadInput(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, ErrorCode::BadInput, msg)
            }

            Error::Unauthorized(msg) => {
                ErrorBody::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
            }

            Error::EventNotFound(id) => ErrorBody::new(
                StatusCode::NOT_FOUND,
                ErrorCode::EventNotFound,
                format!("Event not found: {id}"),
            ),

            Error::Busy(msg) => {
                ErrorBody::new(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Busy, msg)
            }

            Error::Io(e) => internal_body(&format!("io: {e}")),

            Error::Internal(msg) => internal_body(&msg),
        };

        body.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::new(StoreOperation::Read, StoreErrorKind::RateLimited, "quota");
        assert_eq!(err.to_string(), "store rate_limited error during read: quota");
    }

    #[test]
    fn test_retriable_classes() {
        let transient = StoreError::transient(StoreOperation::Append, "503");
        assert!(transient.is_retriable());
        for kind in [
            StoreErrorKind::NotConfigured,
            StoreErrorKind::Unauthorized,
            StoreErrorKind::NotFound,
            StoreErrorKind::RateLimited,
            StoreErrorKind::BadRange,
            StoreErrorKind::AuthFailed,
            StoreErrorKind::Internal,
        ] {
            let err = StoreError::new(StoreOperation::Read, kind, "x");
            assert!(!err.is_retriable(), "{kind} should not be retried");
        }
    }

    #[test]
    fn test_http_mapping_is_total() {
        let cases = [
            (StoreErrorKind::NotConfigured, StatusCode::SERVICE_UNAVAILABLE),
            (StoreErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
            (StoreErrorKind::NotFound, StatusCode::NOT_FOUND),
            (StoreErrorKind::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (StoreErrorKind::UpstreamTransient, StatusCode::INTERNAL_SERVER_ERROR),
            (StoreErrorKind::BadRange, StatusCode::INTERNAL_SERVER_ERROR),
            (StoreErrorKind::AuthFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (StoreErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, expected) in cases {
            let err = Error::Store(StoreError::new(StoreOperation::Read, kind, "x"));
            assert_eq!(err.into_response().status(), expected, "{kind}");
        }
    }

    #[test]
    fn test_busy_maps_to_503() {
        let resp = Error::Busy("write in progress".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let resp = Error::Unauthorized("Missing or invalid authentication".to_string())
            .into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::EventNotFound.as_str(), "EVENT_NOT_FOUND");
        assert_eq!(ErrorCode::BadInput.as_str(), "BAD_INPUT");
        assert_eq!(ErrorCode::ShortlinkInvalidUrl.as_str(), "SHORTLINK_INVALID_URL");
    }

    #[test]
    fn test_internal_body_has_corr_id() {
        let body = internal_body("boom");
        assert_eq!(body.status, 500);
        let corr = body.corr_id.expect("corr id");
        assert!(corr.starts_with("err-"));
    }
}
