//! # Client Error Types
//!
//! Failures talking to the shop backend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reqwest::Error ──timeout──► ClientError::Timeout                       │
//! │                 └─other────► ClientError::Transport                     │
//! │                                                                         │
//! │  non-2xx + {"message": ..} ─► ClientError::Backend { message: Some }    │
//! │  non-2xx, other body ───────► ClientError::Backend { message: None }    │
//! │                                                                         │
//! │  2xx, body fails schema ────► ClientError::Schema                       │
//! │                                                                         │
//! │  ClientError ──► ApiError (apps/shopfront)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, broken body, ...
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// No response within the configured timeout.
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Backend {
        endpoint: String,
        status: u16,
        /// The backend's `message` field, when it sent one.
        message: Option<String>,
    },

    /// The response body does not match the expected schema.
    #[error("Malformed response from {endpoint}: {reason}")]
    Schema { endpoint: String, reason: String },

    /// The payment gateway did not produce a payment URL.
    #[error("Payment could not be started for order {order_id}")]
    PaymentRefused {
        order_id: String,
        message: Option<String>,
    },

    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classifies a reqwest failure.
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_timeout() {
            ClientError::Timeout { endpoint }
        } else {
            ClientError::Transport { endpoint, source }
        }
    }

    /// Builds a `Backend` error from a non-success response body.
    pub fn from_status(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        ClientError::Backend {
            endpoint: endpoint.into(),
            status,
            message: error_message(body),
        }
    }

    pub fn schema(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::Schema {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// The message the backend (or gateway) asked to show the user, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Backend { message, .. } | ClientError::PaymentRefused { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Backend { status: 404, .. })
    }

    /// HTTP 409: the record changed under us.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Backend { status: 409, .. })
    }
}

/// Error bodies look like `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Result type for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_extracted() {
        let err = ClientError::from_status(
            "POST /addOrder",
            400,
            r#"{"message":"Sản phẩm đã hết hàng"}"#,
        );
        assert_eq!(err.backend_message(), Some("Sản phẩm đã hết hàng"));
        assert_eq!(err.to_string(), "POST /addOrder returned HTTP 400");
    }

    #[test]
    fn test_backend_message_absent() {
        let err = ClientError::from_status("GET /allOrders", 500, "<html>Bad Gateway</html>");
        assert_eq!(err.backend_message(), None);

        let err = ClientError::from_status("GET /allOrders", 500, r#"{"message":"  "}"#);
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_status_classification() {
        assert!(ClientError::from_status("GET /orders/x", 404, "").is_not_found());
        assert!(ClientError::from_status("PUT /invoices/x", 409, "").is_conflict());
        assert!(!ClientError::schema("GET /cart", "bad").is_not_found());
    }
}
