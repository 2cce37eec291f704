//! # Validation Module
//!
//! Input validation utilities for Shopfront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA form                                                      │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any network call)                         │
//! │  ├── Checkout shipping fields                                           │
//! │  ├── Cart lines (added or restored from storage)                        │
//! │  └── Manual invoice customer + products                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (REST)                                                │
//! │  └── Authoritative; its error message is surfaced verbatim              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfront_core::validation::{validate_required, validate_quantity};
//!
//! validate_required("phone", "0901234567").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartLine, CustomerInfo, InvoiceProduct, ShippingInfo};
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Fails with `Required` when the trimmed value is empty.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a cancellation reason.
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_reason;
///
/// assert!(validate_reason("Khách đổi ý").is_ok());
/// assert!(validate_reason("   ").is_err());
/// ```
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    validate_required("reason", reason)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantity must be in `1..=MAX_ITEM_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Unit price must be > 0 and at most [`MAX_UNIT_PRICE`].
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE.dong(),
        });
    }

    Ok(())
}

fn validate_not_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Per-unit tax and discount share the unit price bound.
fn validate_adjustment(field: &str, amount: Money) -> ValidationResult<()> {
    validate_not_negative(field, amount)?;
    if amount > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE.dong(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a cart line before it enters the cart.
///
/// Used both for `add_item` and for lines restored from persisted storage.
pub fn validate_cart_line(line: &CartLine) -> ValidationResult<()> {
    validate_required("id", &line.product_id)?;
    validate_required("name", &line.product_name)?;
    validate_required("image", &line.image)?;
    validate_required("color", &line.color)?;
    validate_required("size", &line.size)?;
    validate_price(line.unit_price)?;
    validate_quantity(line.quantity)?;
    Ok(())
}

/// Validates the checkout form.
///
/// ## Checkout Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  place_order                                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_shipping_info ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── any of name/phone/street/ward/district/province empty?        │
/// │       │        → Error: "<field> is required" (no request sent)         │
/// │       │                                                                 │
/// │       └── OK → snapshot cart, POST /addOrder                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_shipping_info(info: &ShippingInfo) -> ValidationResult<()> {
    validate_required("recipient_name", &info.recipient_name)?;
    validate_required("phone", &info.phone)?;
    validate_required("street", &info.street)?;
    validate_required("ward", &info.ward)?;
    validate_required("district", &info.district)?;
    validate_required("province", &info.province)?;
    Ok(())
}

/// Customer name, phone and address are required; email is optional.
pub fn validate_customer_info(customer: &CustomerInfo) -> ValidationResult<()> {
    validate_required("customer.name", &customer.name)?;
    validate_required("customer.phone", &customer.phone)?;
    validate_required("customer.address", &customer.address)?;
    Ok(())
}

pub fn validate_invoice_product(product: &InvoiceProduct) -> ValidationResult<()> {
    validate_required("product_id", &product.product_id)?;
    validate_required("product name", &product.name)?;
    validate_quantity(product.quantity)?;
    validate_price(product.unit_price)?;
    validate_adjustment("tax", product.tax)?;
    validate_adjustment("discount", product.discount)?;
    Ok(())
}

/// A manual invoice needs at least one product, each valid.
pub fn validate_invoice_products(products: &[InvoiceProduct]) -> ValidationResult<()> {
    if products.is_empty() {
        return Err(ValidationError::required("products"));
    }
    products.iter().try_for_each(validate_invoice_product)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            recipient_name: "Trần Thị B".to_string(),
            phone: "0912345678".to_string(),
            street: "5 Nguyễn Huệ".to_string(),
            ward: "Phường 1".to_string(),
            district: "Quận 3".to_string(),
            province: "Hà Nội".to_string(),
            note: None,
        }
    }

    fn product() -> InvoiceProduct {
        InvoiceProduct {
            product_id: "P1".to_string(),
            name: "Quần jean".to_string(),
            quantity: 1,
            unit_price: Money::from_dong(350_000),
            tax: Money::zero(),
            discount: Money::zero(),
            color: None,
            size: None,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "A").is_ok());
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", "   ").is_err());
    }

    #[test]
    fn test_validate_quantity_and_price() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_price(Money::from_dong(1)).is_ok());
        assert!(validate_price(Money::zero()).is_err());
    }

    #[test]
    fn test_quantity_and_price_upper_bounds() {
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        let err = validate_quantity(MAX_ITEM_QUANTITY + 1).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { max: 999, .. }));
        assert!(validate_quantity(i64::MAX).is_err());

        assert!(validate_price(MAX_UNIT_PRICE).is_ok());
        assert!(validate_price(Money::from_dong(i64::MAX)).is_err());

        let mut huge_tax = product();
        huge_tax.tax = Money::from_dong(i64::MAX);
        assert!(validate_invoice_product(&huge_tax).is_err());
    }

    #[test]
    fn test_validate_shipping_info_names_missing_field() {
        assert!(validate_shipping_info(&shipping()).is_ok());

        let mut info = shipping();
        info.ward = " ".to_string();
        let err = validate_shipping_info(&info).unwrap_err();
        assert_eq!(err.to_string(), "ward is required");
    }

    #[test]
    fn test_validate_cart_line() {
        let mut line = CartLine {
            product_id: "P1".to_string(),
            product_name: "Áo".to_string(),
            unit_price: Money::from_dong(100_000),
            quantity: 1,
            color: "Đỏ".to_string(),
            size: "M".to_string(),
            image: "a.jpg".to_string(),
        };
        assert!(validate_cart_line(&line).is_ok());

        line.image.clear();
        assert!(validate_cart_line(&line).is_err());
    }

    #[test]
    fn test_validate_invoice_products() {
        assert!(validate_invoice_products(&[product()]).is_ok());
        assert!(validate_invoice_products(&[]).is_err());

        let mut bad = product();
        bad.quantity = 0;
        assert!(validate_invoice_products(&[product(), bad]).is_err());

        let mut negative_tax = product();
        negative_tax.tax = Money::from_dong(-1);
        assert!(validate_invoice_product(&negative_tax).is_err());
    }

    #[test]
    fn test_validate_customer_info() {
        let customer = CustomerInfo {
            name: "Lê C".to_string(),
            phone: "0987".to_string(),
            address: "Đà Nẵng".to_string(),
            email: None,
        };
        assert!(validate_customer_info(&customer).is_ok());
        assert!(validate_customer_info(&CustomerInfo::default()).is_err());
    }
}
