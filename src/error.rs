/// Unified Error Handling Module
///
/// Every fallible operation in the service funnels into `AppError`.
/// Domain-specific kinds stay distinguishable where it is safe to do so
/// (a missing user) and deliberately collapse into one uniform value where
/// distinguishing would aid an attacker (`AppError::Validation` during
/// token refresh).

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Access-token failures surfaced by the token codec
#[derive(Debug)]
pub enum TokenError {
    /// Signature does not verify, wrong algorithm, or malformed claims
    Invalid,
    /// Structurally valid and correctly signed, but past its expiry
    Expired,
    /// The signing primitive itself failed
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "invalid access token"),
            TokenError::Expired => write!(f, "access token expired"),
            TokenError::Signing(msg) => write!(f, "token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Session-store failures
#[derive(Debug)]
pub enum StorageError {
    NotFound,
    Unavailable(String),
    Query(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "record not found"),
            StorageError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StorageError::Query(msg) => write!(f, "store query failed: {}", msg),
        }
    }
}

impl StdError for StorageError {}

/// Configuration failures detected at startup
#[derive(Debug)]
pub enum SettingsError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::MissingRequired(msg) => write!(f, "missing required setting: {}", msg),
            SettingsError::InvalidValue(msg) => write!(f, "invalid setting: {}", msg),
        }
    }
}

impl StdError for SettingsError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    /// The asserted identity does not exist in the session store
    UserNotFound,
    /// Uniform refresh failure: session not found or refresh secret mismatch.
    /// A unit variant on purpose; both causes must be indistinguishable.
    Validation,
    Token(TokenError),
    /// The secret-hashing primitive failed
    Hashing(String),
    Storage(StorageError),
    Settings(SettingsError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UserNotFound => write!(f, "user not found"),
            AppError::Validation => write!(f, "validation error"),
            AppError::Token(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "secret hashing failed: {}", msg),
            AppError::Storage(e) => write!(f, "{}", e),
            AppError::Settings(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Token(err)
    }
}

/// Store lookups report a missing identity as `StorageError::NotFound`;
/// the service surfaces that as the client-correctable `UserNotFound`.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => AppError::UserNotFound,
            other => AppError::Storage(other),
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Settings(err)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::Unavailable(err.to_string())
            }
            _ => StorageError::Query(err.to_string()),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "user not found".to_string(),
            ),
            AppError::Validation => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "validation error".to_string(),
            ),
            AppError::Token(TokenError::Invalid) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "invalid access token".to_string(),
            ),
            AppError::Token(TokenError::Expired) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "access token expired".to_string(),
            ),
            AppError::Storage(StorageError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "session store temporarily unavailable".to_string(),
            ),
            AppError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "session store error".to_string(),
            ),
            AppError::Settings(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "server configuration error".to_string(),
            ),
            AppError::Token(TokenError::Signing(_))
            | AppError::Hashing(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        }
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::UserNotFound => {
                tracing::warn!(request_id = request_id, "user not found");
            }
            AppError::Validation => {
                tracing::warn!(request_id = request_id, "refresh validation failed");
            }
            AppError::Token(TokenError::Invalid) | AppError::Token(TokenError::Expired) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %self,
                    "access token rejected"
                );
            }
            AppError::Token(TokenError::Signing(_)) | AppError::Hashing(_) => {
                tracing::error!(
                    request_id = request_id,
                    error = %self,
                    "crypto primitive failure"
                );
            }
            AppError::Storage(e) => {
                tracing::error!(
                    request_id = request_id,
                    error = %e,
                    "session store error"
                );
            }
            AppError::Settings(e) => {
                tracing::error!(
                    request_id = request_id,
                    error = %e,
                    "configuration error"
                );
            }
            AppError::Internal(msg) => {
                tracing::error!(
                    request_id = request_id,
                    error = %msg,
                    "internal error"
                );
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, code, message) = self.classify();
        let body = ErrorResponse::new(request_id, message, code.to_string(), status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_uninformative() {
        assert_eq!(AppError::Validation.to_string(), "validation error");
        let (status, code, message) = AppError::Validation.classify();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "validation error");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(AppError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_token_errors_map_to_401() {
        assert_eq!(
            AppError::Token(TokenError::Invalid).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_store_not_found_becomes_user_not_found() {
        let err: AppError = StorageError::NotFound.into();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[test]
    fn test_other_store_errors_stay_storage() {
        let err: AppError = StorageError::Query("boom".to_string()).into();
        assert!(matches!(err, AppError::Storage(StorageError::Query(_))));
    }

    #[test]
    fn test_signing_failure_maps_to_500() {
        let err = AppError::Token(TokenError::Signing("hmac".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_creation() {
        let response = ErrorResponse::new(
            "test-123".to_string(),
            "Test error".to_string(),
            "TEST_ERROR".to_string(),
            400,
        );

        assert_eq!(response.error_id, "test-123");
        assert_eq!(response.code, "TEST_ERROR");
        assert_eq!(response.status, 400);
    }
}
