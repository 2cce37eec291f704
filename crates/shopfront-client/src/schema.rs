//! # Wire Schemas
//!
//! Request/response records for the REST backend and the one place where
//! responses are checked.
//!
//! ## Validation Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body (text)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  decode::<T>()  ── serde_json ──► typed record                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  T::check()     ── structural rules (ids, quantities, amounts)          │
//! │       │                                                                 │
//! │       ├── fail ──► ClientError::Schema (caller never sees the record)   │
//! │       ▼                                                                 │
//! │  services work with trusted domain types only                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown status values are NOT schema violations: they decode to the
//! `Unknown` variants and display as unknown.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use shopfront_core::{Invoice, InvoiceStatus, Money, Order, OrderStatus, PaymentStatus};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Check Trait
// =============================================================================

/// Structural checks applied to every decoded response.
pub trait Check {
    fn check(&self) -> Result<(), String>;
}

/// Decodes and checks a response body.
pub fn decode<T>(endpoint: &str, body: &str) -> ClientResult<T>
where
    T: DeserializeOwned + Check,
{
    let value: T =
        serde_json::from_str(body).map_err(|e| ClientError::schema(endpoint, e.to_string()))?;
    value
        .check()
        .map_err(|reason| ClientError::schema(endpoint, reason))?;
    Ok(value)
}

impl<T: Check> Check for Vec<T> {
    fn check(&self) -> Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.check().map_err(|e| format!("[{}]: {}", i, e)))
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is empty", field))
    } else {
        Ok(())
    }
}

fn non_negative(field: &str, amount: Money) -> Result<(), String> {
    if amount.is_negative() {
        Err(format!("{} is negative", field))
    } else {
        Ok(())
    }
}

impl Check for Order {
    fn check(&self) -> Result<(), String> {
        non_empty("order id", &self.id)?;
        non_negative("shippingFee", self.shipping_fee)?;
        non_negative("totalAmount", self.total_amount)?;
        for (i, line) in self.items.iter().enumerate() {
            non_empty("item productId", &line.product_id)
                .map_err(|e| format!("items[{}]: {}", i, e))?;
            if line.quantity < 1 {
                return Err(format!("items[{}]: quantity {} < 1", i, line.quantity));
            }
            non_negative("item unitPrice", line.unit_price)
                .map_err(|e| format!("items[{}]: {}", i, e))?;
        }
        Ok(())
    }
}

impl Check for Invoice {
    fn check(&self) -> Result<(), String> {
        non_empty("invoice id", &self.id)?;
        for (i, product) in self.products.iter().enumerate() {
            if product.quantity < 1 {
                return Err(format!("products[{}]: quantity {} < 1", i, product.quantity));
            }
            non_negative("product unitPrice", product.unit_price)
                .map_err(|e| format!("products[{}]: {}", i, e))?;
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /cart?userId=` response.
///
/// Entries stay untyped here: a single incomplete line must not fail the
/// whole cart. The cart decodes them one by one and drops the bad ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl Check for CartResponse {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// `PUT /updateOrder/:id` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Filter for `GET /allOrders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<OrderStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Matches order id, recipient name or phone.
    pub search: Option<String>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        OrderQuery {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            status: None,
            from: None,
            to: None,
            search: None,
        }
    }
}

impl OrderQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = self.status {
            params.push(("status", status.code().to_string()));
        }
        if let Some(from) = self.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        push_search(&mut params, &self.search);
        params
    }
}

// =============================================================================
// Payment
// =============================================================================

/// `POST /create_payment_url` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlRequest {
    pub order_id: String,
    pub amount: Money,
}

/// `POST /create_payment_url` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrlResponse {
    pub success: bool,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Check for PaymentUrlResponse {
    fn check(&self) -> Result<(), String> {
        if self.success && self.payment_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err("success without paymentUrl".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Invoices
// =============================================================================

/// `POST /invoices/cancel/:id` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelInvoiceRequest {
    pub reason: String,
    pub performed_by: String,
}

/// Filter for `GET /invoices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<InvoiceStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Matches invoice id, order id, customer name or phone.
    pub search: Option<String>,
}

impl Default for InvoiceQuery {
    fn default() -> Self {
        InvoiceQuery {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            status: None,
            payment_status: None,
            search: None,
        }
    }
}

impl InvoiceQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = &self.status {
            params.push(("status", status.label().to_string()));
        }
        if let Some(payment_status) = &self.payment_status {
            params.push(("paymentStatus", payment_status.label().to_string()));
        }
        push_search(&mut params, &self.search);
        params
    }
}

// =============================================================================
// Pagination
// =============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl<T: Check> Check for Page<T> {
    fn check(&self) -> Result<(), String> {
        if self.page == 0 {
            return Err("page must start at 1".to_string());
        }
        self.data.check()
    }
}

fn push_search(params: &mut Vec<(&'static str, String)>, search: &Option<String>) {
    if let Some(search) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        params.push(("search", search.to_string()));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "_id": "66a1f0",
        "customerId": "c1",
        "placedAt": "2026-03-01T08:30:00Z",
        "status": 2,
        "recipientName": "Nguyễn Văn A",
        "phone": "0901234567",
        "deliveryAddress": "12 Lê Lợi, Phường Bến Nghé, Quận 1, TP. Hồ Chí Minh",
        "note": null,
        "paymentMethod": "cod",
        "shippingFee": 25000,
        "totalAmount": 224999,
        "items": [{
            "productId": "P1", "productName": "Áo thun", "image": "p1.jpg",
            "color": "Đỏ", "size": "M", "unitPrice": 199999, "quantity": 1
        }]
    }"#;

    #[test]
    fn test_decode_order() {
        let order: Order = decode("GET /orders/66a1f0", ORDER_JSON).unwrap();
        assert_eq!(order.id, "66a1f0");
        assert_eq!(order.status, OrderStatus::Approved);
        assert_eq!(order.total_amount, Money::from_dong(224_999));
        assert_eq!(order.subtotal(), Money::from_dong(199_999));
    }

    #[test]
    fn test_decode_order_with_unknown_status() {
        let json = ORDER_JSON.replace("\"status\": 2", "\"status\": 7");
        let order: Order = decode("GET /orders/66a1f0", &json).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown(7));
    }

    #[test]
    fn test_decode_rejects_bad_quantity() {
        let json = ORDER_JSON.replace("\"quantity\": 1", "\"quantity\": 0");
        let err = decode::<Order>("GET /orders/66a1f0", &json).unwrap_err();
        assert!(matches!(err, ClientError::Schema { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let err = decode::<Order>("GET /orders/x", r#"{"_id":"x"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Schema { .. }));
    }

    #[test]
    fn test_decode_cart_response() {
        let body = r#"{"items":[
            {"id":"P1","name":"Áo","price":100000,"quantity":2,"image":"a.jpg","color":"Red","size":"M"}
        ]}"#;
        let cart: CartResponse = decode("GET /cart", body).unwrap();
        assert_eq!(cart.items.len(), 1);

        let empty: CartResponse = decode("GET /cart", "{}").unwrap();
        assert!(empty.items.is_empty());

        // Bad entries are the cart's business, not a schema failure.
        let incomplete = r#"{"items":[{"id":"P1","name":"Áo","price":0,"quantity":2,"image":"a.jpg","color":"Red","size":"M"},{"id":"P2"}]}"#;
        let cart: CartResponse = decode("GET /cart", incomplete).unwrap();
        assert_eq!(cart.items.len(), 2);

        assert!(decode::<CartResponse>("GET /cart", r#"{"items":{"id":"P1"}}"#).is_err());
    }

    #[test]
    fn test_decode_page_of_orders() {
        let body = format!(r#"{{"data":[{}],"page":1,"totalPages":2,"total":21}}"#, ORDER_JSON);
        let page: Page<Order> = decode("GET /allOrders", &body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.has_next());
    }

    #[test]
    fn test_payment_url_response_check() {
        let ok: PaymentUrlResponse = decode(
            "POST /create_payment_url",
            r#"{"success":true,"paymentUrl":"https://sandbox.vnpayment.vn/pay?x=1"}"#,
        )
        .unwrap();
        assert!(ok.success);

        let refused: PaymentUrlResponse = decode(
            "POST /create_payment_url",
            r#"{"success":false,"message":"Cổng thanh toán bận"}"#,
        )
        .unwrap();
        assert!(!refused.success);

        assert!(decode::<PaymentUrlResponse>("POST /create_payment_url", r#"{"success":true}"#)
            .is_err());
    }

    #[test]
    fn test_query_params() {
        let query = OrderQuery {
            status: Some(OrderStatus::Shipping),
            from: NaiveDate::from_ymd_opt(2026, 1, 1),
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let params = query.to_params();
        assert!(params.contains(&("status", "3".to_string())));
        assert!(params.contains(&("from", "2026-01-01".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "search"));

        let query = InvoiceQuery {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        assert!(query
            .to_params()
            .contains(&("paymentStatus", "Đã thanh toán".to_string())));
    }
}
