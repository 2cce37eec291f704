//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule / state-conflict failures        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopfront-db errors      └── DbError      - Local storage failures    │
//! │  shopfront-client errors  └── ClientError  - Backend/transport failures│
//! │                                                                         │
//! │  apps/shopfront           └── ApiError     - What the user sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order ID, invoice ID, field)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The action requires a staff actor.
    #[error("Only staff may {action}")]
    StaffOnly { action: String },

    /// Invoice is no longer editable.
    ///
    /// ## When This Occurs
    /// - Updating an invoice after it was cancelled
    /// - Cancelling an invoice a second time
    #[error("Invoice {invoice_id} is {status}, cannot {action}")]
    InvoiceNotActive {
        invoice_id: String,
        status: String,
        action: String,
    },

    /// Order status does not allow the requested move.
    ///
    /// ## When This Occurs
    /// - Cancelling an order that is already Shipping or Delivered
    #[error("Order {order_id} is {current}, cannot move to {requested}")]
    InvalidOrderTransition {
        order_id: String,
        current: String,
        requested: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a StaffOnly error for the given action.
    pub fn staff_only(action: impl Into<String>) -> Self {
        CoreError::StaffOnly {
            action: action.into(),
        }
    }

    /// Returns true for errors caused by the record's current state.
    ///
    /// The UI re-fetches the record after these instead of assuming success.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            CoreError::InvoiceNotActive { .. } | CoreError::InvalidOrderTransition { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any network call; never sent to the backend.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value outside the allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvoiceNotActive {
            invoice_id: "INV-7".to_string(),
            status: "Đã hủy".to_string(),
            action: "cancel".to_string(),
        };
        assert_eq!(err.to_string(), "Invoice INV-7 is Đã hủy, cannot cancel");

        let err = CoreError::staff_only("change order status");
        assert_eq!(err.to_string(), "Only staff may change order status");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("phone");
        assert_eq!(err.to_string(), "phone is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_state_conflict());
    }

    #[test]
    fn test_state_conflict_classification() {
        let err = CoreError::InvalidOrderTransition {
            order_id: "o1".to_string(),
            current: "Delivered".to_string(),
            requested: "Cancelled".to_string(),
        };
        assert!(err.is_state_conflict());
        assert!(!CoreError::EmptyCart.is_state_conflict());
    }
}
