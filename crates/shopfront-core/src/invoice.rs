//! # Invoice Module
//!
//! Financial totals and the Active → Cancelled invoice lifecycle.
//!
//! ## Financials
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal        = Σ unit_price × quantity                              │
//! │  total_tax       = Σ tax        × quantity                              │
//! │  total_discount  = Σ discount   × quantity                              │
//! │  final_amount    = subtotal + total_tax − total_discount                │
//! │                                                                         │
//! │  Recomputed in one step whenever the product list changes.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//!   derive_from_order ─┐
//!                      ├──► Active ──update──► Active (log: updated)
//!   new_manual ────────┘       │
//!                              └──cancel(reason)──► Cancelled (log: cancelled)
//!                                                      │
//!                              update / cancel ──► InvoiceNotActive, no log
//! ```
//!
//! Functions take `now` explicitly so the module stays free of clocks.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::require_staff;
use crate::types::{
    Actor, CreatedType, CustomerInfo, Financials, Invoice, InvoiceLog, InvoicePatch,
    InvoiceProduct, InvoiceStatus, LogAction, NewInvoice, Order, PaymentMethod, PaymentStatus,
};
use crate::validation::{
    validate_customer_info, validate_invoice_products, validate_reason,
};

// =============================================================================
// Financials
// =============================================================================

impl Financials {
    /// Computes all four totals from the product list.
    pub fn compute(products: &[InvoiceProduct]) -> Self {
        let subtotal: Money = products
            .iter()
            .map(|p| p.unit_price.multiply_quantity(p.quantity))
            .sum();
        let total_tax: Money = products
            .iter()
            .map(|p| p.tax.multiply_quantity(p.quantity))
            .sum();
        let total_discount: Money = products
            .iter()
            .map(|p| p.discount.multiply_quantity(p.quantity))
            .sum();

        Financials {
            subtotal,
            total_tax,
            total_discount,
            final_amount: subtotal + total_tax - total_discount,
        }
    }

    /// True when `final_amount` agrees with the other three totals.
    pub fn is_balanced(&self) -> bool {
        self.subtotal + self.total_tax - self.total_discount == self.final_amount
    }
}

// =============================================================================
// Creation
// =============================================================================

/// Builds the automatic invoice for an approved order.
///
/// Products are copied from the order lines with zero tax and discount.
pub fn derive_from_order(order: &Order, actor: &Actor, now: DateTime<Utc>) -> CoreResult<NewInvoice> {
    require_staff(actor, "create invoices")?;

    let products: Vec<InvoiceProduct> = order
        .items
        .iter()
        .map(|line| InvoiceProduct {
            product_id: line.product_id.clone(),
            name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            tax: Money::zero(),
            discount: Money::zero(),
            color: Some(line.color.clone()),
            size: Some(line.size.clone()),
        })
        .collect();

    Ok(NewInvoice {
        order_id: Some(order.id.clone()),
        customer: CustomerInfo {
            name: order.recipient_name.clone(),
            phone: order.phone.clone(),
            address: order.delivery_address.clone(),
            email: None,
        },
        financials: Financials::compute(&products),
        products,
        payment_method: order.payment_method,
        payment_status: PaymentStatus::Unpaid,
        status: InvoiceStatus::Active,
        created_type: CreatedType::Auto,
        logs: vec![log(
            LogAction::Created,
            format!("Tạo hóa đơn từ đơn hàng {}", order.id),
            actor,
            now,
        )],
    })
}

/// Builds a staff-entered invoice with no backing order.
pub fn new_manual(
    customer: CustomerInfo,
    products: Vec<InvoiceProduct>,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> CoreResult<NewInvoice> {
    require_staff(actor, "create invoices")?;
    validate_customer_info(&customer)?;
    validate_invoice_products(&products)?;

    Ok(NewInvoice {
        order_id: None,
        customer,
        financials: Financials::compute(&products),
        products,
        payment_method,
        payment_status,
        status: InvoiceStatus::Active,
        created_type: CreatedType::Manual,
        logs: vec![log(
            LogAction::Created,
            "Tạo hóa đơn thủ công".to_string(),
            actor,
            now,
        )],
    })
}

// =============================================================================
// Mutation
// =============================================================================

/// Applies staff edits to an active invoice.
///
/// ## Errors
/// - `StaffOnly` for non-staff actors
/// - `InvoiceNotActive` once cancelled (the invoice is left untouched)
/// - `Validation` for bad customer or product data
pub fn apply_patch(
    invoice: &mut Invoice,
    patch: InvoicePatch,
    actor: &Actor,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    require_staff(actor, "update invoices")?;
    ensure_active(invoice, "update")?;

    if let Some(customer) = &patch.customer {
        validate_customer_info(customer)?;
    }
    if let Some(products) = &patch.products {
        validate_invoice_products(products)?;
    }

    if let Some(customer) = patch.customer {
        invoice.customer = customer;
    }
    if let Some(products) = patch.products {
        invoice.financials = Financials::compute(&products);
        invoice.products = products;
    }
    if let Some(method) = patch.payment_method {
        invoice.payment_method = method;
    }
    if let Some(status) = patch.payment_status {
        invoice.payment_status = status;
    }

    let note = patch
        .note
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Cập nhật hóa đơn".to_string());
    invoice.logs.push(log(LogAction::Updated, note, actor, now));
    invoice.updated_at = now;
    Ok(())
}

/// Cancels an active invoice, recording the reason.
///
/// A second cancel fails with `InvoiceNotActive` and appends nothing.
pub fn cancel(invoice: &mut Invoice, reason: &str, actor: &Actor, now: DateTime<Utc>) -> CoreResult<()> {
    require_staff(actor, "cancel invoices")?;
    validate_reason(reason)?;
    ensure_active(invoice, "cancel")?;

    invoice.status = InvoiceStatus::Cancelled;
    invoice
        .logs
        .push(log(LogAction::Cancelled, reason.trim().to_string(), actor, now));
    invoice.updated_at = now;
    Ok(())
}

/// Fails with `InvoiceNotActive` unless the invoice is Active.
pub fn ensure_active(invoice: &Invoice, action: &str) -> CoreResult<()> {
    if invoice.status == InvoiceStatus::Active {
        return Ok(());
    }
    Err(CoreError::InvoiceNotActive {
        invoice_id: invoice.id.clone(),
        status: invoice.status.display_label().to_string(),
        action: action.to_string(),
    })
}

fn log(action: LogAction, note: String, actor: &Actor, now: DateTime<Utc>) -> InvoiceLog {
    InvoiceLog {
        action,
        note,
        timestamp: now,
        performed_by: actor.display_name().to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
