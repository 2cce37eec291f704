//! # Order Module
//!
//! Checkout snapshot, shipping fee and the staff rules of the order lifecycle.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │   place_order ──► Pending ──► Approved ──► Shipping ──► Delivered       │
//! │                      │            │                                     │
//! │                      └─────┬──────┘                                     │
//! │                            ▼                                            │
//! │                        Cancelled          (staff only)                  │
//! │                                                                         │
//! │   Only a Pending order can be approved. Staff may set any other        │
//! │   status directly; Delivered and Cancelled are terminal for cancel.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Rule
//! Items are copied from the cart at placement. Later cart or catalogue
//! changes never reach a placed order.

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    Actor, NewOrder, Order, OrderLine, OrderStatus, PaymentMethod, RecipientEdit, ShippingInfo,
};
use crate::validation::{validate_required, validate_shipping_info};
use crate::{FREE_SHIPPING_THRESHOLD, SHIPPING_FEE};

// =============================================================================
// Totals
// =============================================================================

/// Flat fee below the free-shipping threshold, zero at or above it.
///
/// ## Example
/// ```rust
/// use shopfront_core::money::Money;
/// use shopfront_core::order::shipping_fee;
///
/// assert_eq!(shipping_fee(Money::from_dong(199_999)).dong(), 25_000);
/// assert!(shipping_fee(Money::from_dong(200_000)).is_zero());
/// ```
pub fn shipping_fee(subtotal: Money) -> Money {
    if subtotal < FREE_SHIPPING_THRESHOLD {
        SHIPPING_FEE
    } else {
        Money::zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total_amount: Money,
}

impl OrderTotals {
    pub fn for_lines(lines: &[OrderLine]) -> Self {
        let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();
        let shipping_fee = shipping_fee(subtotal);
        OrderTotals {
            subtotal,
            shipping_fee,
            total_amount: subtotal + shipping_fee,
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Builds the order request from the cart.
///
/// ## Errors
/// - [`CoreError::Validation`] when a shipping field is empty
/// - [`CoreError::EmptyCart`] when there is nothing to order
///
/// Both are raised before any request is made.
pub fn build_new_order(
    customer_id: &str,
    cart: &Cart,
    shipping: &ShippingInfo,
    payment_method: PaymentMethod,
) -> CoreResult<NewOrder> {
    validate_required("customer_id", customer_id)?;
    validate_shipping_info(shipping)?;
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let items: Vec<OrderLine> = cart.lines().iter().map(OrderLine::from).collect();
    let totals = OrderTotals::for_lines(&items);

    Ok(NewOrder {
        customer_id: customer_id.to_string(),
        recipient_name: shipping.recipient_name.trim().to_string(),
        phone: shipping.phone.trim().to_string(),
        delivery_address: shipping.delivery_address(),
        note: shipping
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        payment_method,
        items,
        shipping_fee: totals.shipping_fee,
        total_amount: totals.total_amount,
    })
}

// =============================================================================
// Staff Rules
// =============================================================================

/// Fails with `StaffOnly` unless the actor is staff.
pub fn require_staff(actor: &Actor, action: &str) -> CoreResult<()> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(CoreError::staff_only(action))
    }
}

/// What a cancel request should do given the order's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPlan {
    /// Send the cancel request.
    Cancel,
    /// Already cancelled; nothing to send.
    AlreadyCancelled,
}

/// Decides whether an order may be cancelled.
///
/// ## Rules
/// - Pending, Approved → [`CancelPlan::Cancel`]
/// - Cancelled → [`CancelPlan::AlreadyCancelled`]
/// - Shipping, Delivered, unknown → `InvalidOrderTransition`
pub fn plan_cancel(order: &Order) -> CoreResult<CancelPlan> {
    match order.status {
        OrderStatus::Pending | OrderStatus::Approved => Ok(CancelPlan::Cancel),
        OrderStatus::Cancelled => Ok(CancelPlan::AlreadyCancelled),
        current => Err(CoreError::InvalidOrderTransition {
            order_id: order.id.clone(),
            current: current.label().to_string(),
            requested: OrderStatus::Cancelled.label().to_string(),
        }),
    }
}

/// Approval derives the invoice, so it happens once, from Pending.
pub fn plan_approve(order: &Order) -> CoreResult<()> {
    match order.status {
        OrderStatus::Pending => Ok(()),
        current => Err(CoreError::InvalidOrderTransition {
            order_id: order.id.clone(),
            current: current.label().to_string(),
            requested: OrderStatus::Approved.label().to_string(),
        }),
    }
}

/// Edits may omit fields but may not blank them.
pub fn validate_recipient_edit(edit: &RecipientEdit) -> Result<(), ValidationError> {
    let fields = [
        ("recipient_name", &edit.recipient_name),
        ("phone", &edit.phone),
        ("delivery_address", &edit.delivery_address),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            validate_required(field, value)?;
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
