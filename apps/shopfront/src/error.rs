//! # API Error Type
//!
//! Unified, user-facing error type for every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopfront                              │
//! │                                                                         │
//! │  Service call (place_order, cancel invoice, ...)                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │                                                                  │  │
//! │  │  CoreError::Validation ───────────────► VALIDATION_ERROR         │  │
//! │  │  CoreError::InvoiceNotActive ─────────► CONFLICT                 │  │
//! │  │  CoreError::StaffOnly ────────────────► FORBIDDEN                │  │
//! │  │  ClientError::Backend {message} ──────► backend message verbatim │  │
//! │  │  ClientError::Backend {None} ─────────► generic retry prompt     │  │
//! │  │  ClientError::Timeout/Transport ──────► BACKEND_UNAVAILABLE      │  │
//! │  │  DbError::* ──────────────────────────► DATABASE_ERROR           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Corrupt cart data never gets here: it is repaired and logged.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shopfront_client::ClientError;
use shopfront_core::CoreError;
use shopfront_db::DbError;

/// Shown when the backend fails without saying why.
pub const RETRY_PROMPT: &str = "Đã có lỗi xảy ra, vui lòng thử lại sau";

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Invoice INV-7 is Đã hủy, cannot cancel"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// The record's current state forbids the action (409)
    Conflict,

    /// Staff-only action attempted by a customer (403)
    Forbidden,

    /// Cart operation failed
    CartError,

    /// Payment gateway did not return a payment URL
    PaymentError,

    /// Backend unreachable, timed out, or failed
    BackendUnavailable,

    /// Local storage failed
    DatabaseError,

    /// Rendering an export failed
    ExportError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    /// Creates an export error.
    pub fn export(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ExportError, message)
    }

    /// True for errors the UI answers by re-fetching the record.
    pub fn is_conflict(&self) -> bool {
        self.code == ErrorCode::Conflict
    }
}

/// Service result alias.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ApiError::cart(err.to_string()),
            CoreError::StaffOnly { .. } => ApiError::new(ErrorCode::Forbidden, err.to_string()),
            CoreError::InvoiceNotActive { .. } | CoreError::InvalidOrderTransition { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts backend client errors to API errors.
///
/// The backend's own `message` is shown verbatim; anything else becomes
/// [`RETRY_PROMPT`] and the detail goes to the log.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Backend {
                endpoint,
                status,
                message,
            } => {
                let code = match status {
                    404 => ErrorCode::NotFound,
                    409 => ErrorCode::Conflict,
                    400 | 422 => ErrorCode::ValidationError,
                    403 => ErrorCode::Forbidden,
                    _ => ErrorCode::BackendUnavailable,
                };
                match message {
                    Some(message) => ApiError::new(code, message),
                    None => {
                        tracing::error!(%endpoint, status, "Backend error without message");
                        ApiError::new(code, RETRY_PROMPT)
                    }
                }
            }
            ClientError::PaymentRefused { order_id, message } => {
                tracing::warn!(%order_id, ?message, "Payment URL refused");
                ApiError::new(
                    ErrorCode::PaymentError,
                    message.unwrap_or_else(|| RETRY_PROMPT.to_string()),
                )
            }
            ClientError::Config(e) => ApiError::internal(format!("Invalid configuration: {}", e)),
            other => {
                tracing::error!("Backend request failed: {}", other);
                ApiError::new(ErrorCode::BackendUnavailable, RETRY_PROMPT)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::ValidationError;

    #[test]
    fn test_backend_message_is_surfaced_verbatim() {
        let err: ApiError = ClientError::Backend {
            endpoint: "/addOrder".to_string(),
            status: 400,
            message: Some("Số điện thoại không hợp lệ".to_string()),
        }
        .into();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Số điện thoại không hợp lệ");
    }

    #[test]
    fn test_backend_error_without_message_gets_retry_prompt() {
        let err: ApiError = ClientError::Backend {
            endpoint: "/allOrders".to_string(),
            status: 502,
            message: None,
        }
        .into();

        assert_eq!(err.code, ErrorCode::BackendUnavailable);
        assert_eq!(err.message, RETRY_PROMPT);

        let err: ApiError = ClientError::Timeout {
            endpoint: "/invoices".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
    }

    #[test]
    fn test_core_error_codes() {
        let conflict: ApiError = CoreError::InvoiceNotActive {
            invoice_id: "INV-1".to_string(),
            status: "Đã hủy".to_string(),
            action: "cancel".to_string(),
        }
        .into();
        assert!(conflict.is_conflict());

        let forbidden: ApiError = CoreError::staff_only("cancel orders").into();
        assert_eq!(forbidden.code, ErrorCode::Forbidden);

        let invalid: ApiError = CoreError::from(ValidationError::required("phone")).into();
        assert_eq!(invalid.code, ErrorCode::ValidationError);
        assert_eq!(invalid.message, "phone is required");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::not_found("Invoice", "INV-9");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Invoice not found: INV-9");
    }
}
