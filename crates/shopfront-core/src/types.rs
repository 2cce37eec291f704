//! # Domain Types
//!
//! Core domain records shared by the storefront and the manager.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    CartLine     │   │      Order      │   │       Invoice       │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  product_id     │──►│  id (server)    │──►│  id                 │   │
//! │  │  color, size    │   │  status (1..5)  │   │  order_id?          │   │
//! │  │  unit_price     │   │  items (frozen) │   │  products, logs     │   │
//! │  │  quantity ≥ 1   │   │  total_amount   │   │  financials         │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  OrderStatus    Pending │ Approved │ Shipping │ Delivered │ Cancelled  │
//! │  PaymentStatus  Chưa thanh toán │ Đã thanh toán │ Đã hoàn tiền          │
//! │  InvoiceStatus  Hoạt động │ Đã hủy                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Closed Enumerations With a Fallback
//! Status values arriving from the backend are closed sets, but an unknown
//! value must never break decoding. Each status enum therefore carries an
//! `Unknown` variant that keeps the raw value and displays as
//! [`UNKNOWN_STATUS_LABEL`](crate::UNKNOWN_STATUS_LABEL).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::UNKNOWN_STATUS_LABEL;

// =============================================================================
// Cart
// =============================================================================

/// One product + variant + quantity entry in a pre-checkout cart.
///
/// The serde names match the persisted browser-storage layout
/// (`id, name, price, quantity, image, color, size`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: String,
    #[serde(rename = "name")]
    pub product_name: String,
    #[serde(rename = "price")]
    pub unit_price: Money,
    pub quantity: i64,
    pub color: String,
    pub size: String,
    pub image: String,
}

impl CartLine {
    /// Returns the merge key of this line.
    pub fn key(&self) -> CartLineKey {
        CartLineKey {
            product_id: self.product_id.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
        }
    }

    /// Returns true if this line has the given key.
    pub fn has_key(&self, key: &CartLineKey) -> bool {
        self.product_id == key.product_id && self.color == key.color && self.size == key.size
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Uniqueness key of a cart line: (product_id, color, size).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLineKey {
    pub product_id: String,
    pub color: String,
    pub size: String,
}

impl CartLineKey {
    pub fn new(
        product_id: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        CartLineKey {
            product_id: product_id.into(),
            color: color.into(),
            size: size.into(),
        }
    }
}

// =============================================================================
// Identity / Actor
// =============================================================================

/// Who owns the storefront session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Not logged in; cart lives only in local storage.
    Guest,
    /// Logged-in customer; the backend also keeps a cart for this id.
    Customer { customer_id: String },
}

/// Who performs a lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Customer { customer_id: String },
    Staff { name: String },
}

impl Actor {
    pub fn staff(name: impl Into<String>) -> Self {
        Actor::Staff { name: name.into() }
    }

    pub fn customer(customer_id: impl Into<String>) -> Self {
        Actor::Customer {
            customer_id: customer_id.into(),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::Staff { .. })
    }

    /// Name recorded in invoice logs.
    pub fn display_name(&self) -> &str {
        match self {
            Actor::Customer { customer_id } => customer_id,
            Actor::Staff { name } => name,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Manual bank transfer.
    BankTransfer,
    /// Cash at the counter (manual invoices).
    Cash,
    /// VNPay hosted checkout; the customer is redirected to a payment URL.
    #[serde(rename = "vnpay")]
    VnPay,
}

impl PaymentMethod {
    /// Redirect-based gateways need a payment URL before checkout completes.
    pub fn is_redirect_gateway(&self) -> bool {
        matches!(self, PaymentMethod::VnPay)
    }

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::VnPay => "vnpay",
        }
    }

    /// Vietnamese display label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Thanh toán khi nhận hàng",
            PaymentMethod::BankTransfer => "Chuyển khoản",
            PaymentMethod::Cash => "Tiền mặt",
            PaymentMethod::VnPay => "VNPay",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "bank_transfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            "cash" => Ok(PaymentMethod::Cash),
            "vnpay" => Ok(PaymentMethod::VnPay),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_method".to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Order status, carried on the wire as an integer code 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum OrderStatus {
    Pending,
    Approved,
    Shipping,
    Delivered,
    Cancelled,
    /// A code outside 1..=5.
    Unknown(i32),
}

impl OrderStatus {
    /// Wire code.
    pub fn code(&self) -> i32 {
        match self {
            OrderStatus::Pending => 1,
            OrderStatus::Approved => 2,
            OrderStatus::Shipping => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => 5,
            OrderStatus::Unknown(code) => *code,
        }
    }

    /// Vietnamese display label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Chờ xác nhận",
            OrderStatus::Approved => "Đã xác nhận",
            OrderStatus::Shipping => "Đang giao hàng",
            OrderStatus::Delivered => "Đã giao hàng",
            OrderStatus::Cancelled => "Đã hủy",
            OrderStatus::Unknown(_) => UNKNOWN_STATUS_LABEL,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl From<i32> for OrderStatus {
    fn from(code: i32) -> Self {
        match code {
            1 => OrderStatus::Pending,
            2 => OrderStatus::Approved,
            3 => OrderStatus::Shipping,
            4 => OrderStatus::Delivered,
            5 => OrderStatus::Cancelled,
            other => OrderStatus::Unknown(other),
        }
    }
}

impl From<OrderStatus> for i32 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    /// Accepts English names or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "1" => Ok(OrderStatus::Pending),
            "approved" | "2" => Ok(OrderStatus::Approved),
            "shipping" | "3" => Ok(OrderStatus::Shipping),
            "delivered" | "4" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" | "5" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Invoice Statuses
// =============================================================================

/// Invoice payment status, carried on the wire as a Vietnamese label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
    Unknown(String),
}

impl PaymentStatus {
    pub fn label(&self) -> &str {
        match self {
            PaymentStatus::Unpaid => "Chưa thanh toán",
            PaymentStatus::Paid => "Đã thanh toán",
            PaymentStatus::Refunded => "Đã hoàn tiền",
            PaymentStatus::Unknown(raw) => raw,
        }
    }

    /// Label for display; unknown values show the generic unknown label.
    pub fn display_label(&self) -> &str {
        match self {
            PaymentStatus::Unknown(_) => UNKNOWN_STATUS_LABEL,
            known => known.label(),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Chưa thanh toán" => PaymentStatus::Unpaid,
            "Đã thanh toán" => PaymentStatus::Paid,
            "Đã hoàn tiền" => PaymentStatus::Refunded,
            _ => PaymentStatus::Unknown(label),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unknown(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => match PaymentStatus::from(s.to_string()) {
                PaymentStatus::Unknown(raw) => Err(ValidationError::InvalidFormat {
                    field: "payment_status".to_string(),
                    reason: format!("unknown payment status '{}'", raw),
                }),
                known => Ok(known),
            },
        }
    }
}

/// Invoice lifecycle status, carried on the wire as a Vietnamese label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Active,
    Cancelled,
    Unknown(String),
}

impl InvoiceStatus {
    pub fn label(&self) -> &str {
        match self {
            InvoiceStatus::Active => "Hoạt động",
            InvoiceStatus::Cancelled => "Đã hủy",
            InvoiceStatus::Unknown(raw) => raw,
        }
    }

    pub fn display_label(&self) -> &str {
        match self {
            InvoiceStatus::Unknown(_) => UNKNOWN_STATUS_LABEL,
            known => known.label(),
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Hoạt động" => InvoiceStatus::Active,
            "Đã hủy" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Unknown(label),
        }
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Unknown(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// How an invoice came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CreatedType {
    /// Derived from an approved order.
    Auto,
    /// Entered by staff.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Created,
    Updated,
    Cancelled,
}

// =============================================================================
// Order
// =============================================================================

/// Delivery and contact details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub ward: String,
    pub district: String,
    pub province: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ShippingInfo {
    /// Single-line address as stored on the order.
    pub fn delivery_address(&self) -> String {
        [&self.street, &self.ward, &self.district, &self.province]
            .iter()
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A frozen copy of a cart line at the moment the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub image: String,
    pub color: String,
    pub size: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        OrderLine {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            image: line.image.clone(),
            color: line.color.clone(),
            size: line.size.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// The body of `POST /addOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: String,
    pub recipient_name: String,
    pub phone: String,
    pub delivery_address: String,
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderLine>,
    pub shipping_fee: Money,
    pub total_amount: Money,
}

/// A committed order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    #[ts(as = "i32")]
    pub status: OrderStatus,
    pub recipient_name: String,
    pub phone: String,
    pub delivery_address: String,
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    pub shipping_fee: Money,
    pub total_amount: Money,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Σ(line price × quantity), excluding shipping.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(OrderLine::line_total).sum()
    }
}

/// Recipient corrections applied by staff when approving an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecipientEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Invoice
// =============================================================================

/// Customer details frozen onto an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// One itemised invoice row. `tax` and `discount` are per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    pub subtotal: Money,
    pub total_tax: Money,
    pub total_discount: Money,
    pub final_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLog {
    pub action: LogAction,
    pub note: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub performed_by: String,
}

/// A billing record derived from an order or created manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(alias = "_id")]
    pub id: String,
    /// Absent on manual invoices.
    #[serde(default)]
    pub order_id: Option<String>,
    pub customer: CustomerInfo,
    pub products: Vec<InvoiceProduct>,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub status: InvoiceStatus,
    pub financials: Financials,
    pub created_type: CreatedType,
    #[serde(default)]
    pub logs: Vec<InvoiceLog>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// The body of `POST /invoices`; the backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub order_id: Option<String>,
    pub customer: CustomerInfo,
    pub products: Vec<InvoiceProduct>,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub status: InvoiceStatus,
    pub financials: Financials,
    pub created_type: CreatedType,
    pub logs: Vec<InvoiceLog>,
}

/// Staff edits to an active invoice. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePatch {
    pub customer: Option<CustomerInfo>,
    pub products: Option<Vec<InvoiceProduct>>,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "Option<String>")]
    pub payment_status: Option<PaymentStatus>,
    /// Free-text note recorded on the `updated` log entry.
    pub note: Option<String>,
}

impl InvoicePatch {
    pub fn is_empty(&self) -> bool {
        self.customer.is_none()
            && self.products.is_none()
            && self.payment_method.is_none()
            && self.payment_status.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
