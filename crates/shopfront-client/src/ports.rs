//! # Backend Ports
//!
//! The backend is an external collaborator. Services depend on these traits,
//! never on HTTP, so they can be driven by [`RestBackend`](crate::RestBackend)
//! in production and by mocks or fakes in tests.
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   CartBackend    │   │   OrderBackend   │   │  InvoiceBackend  │
//! │ GET /cart        │   │ POST /addOrder   │   │ GET  /invoices   │
//! └──────────────────┘   │ PUT  /updateOrder│   │ POST /invoices   │
//!                        │ PUT  /approveOrder   │ PUT  /invoices/:id
//! ┌──────────────────┐   │ DELETE /deleteOrder  │ POST /invoices/  │
//! │  PaymentGateway  │   │ GET  /orders/..  │   │      cancel/:id  │
//! │ POST /create_    │   │ GET  /allOrders  │   └──────────────────┘
//! │   payment_url    │   └──────────────────┘
//! └──────────────────┘
//! ```
//!
//! Mutating order calls return the order as the backend now stores it, so
//! callers never have to trust an optimistic local copy.

use async_trait::async_trait;
use mockall::automock;

use shopfront_core::{
    Invoice, NewInvoice, NewOrder, Order, OrderStatus, RecipientEdit,
};

use crate::error::ClientResult;
use crate::schema::{InvoiceQuery, OrderQuery, Page, PaymentUrlRequest, PaymentUrlResponse};

#[automock]
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Server-side cart entries of an authenticated customer, undecoded.
    ///
    /// Entries are validated one by one when the cart adopts them.
    async fn fetch_cart(&self, customer_id: &str) -> ClientResult<Vec<serde_json::Value>>;
}

#[automock]
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Creates an order in Pending and returns it with its server id.
    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order>;

    async fn order(&self, order_id: &str) -> ClientResult<Order>;

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order>;

    /// Applies recipient corrections and moves the order to Approved.
    async fn approve(&self, order_id: &str, edit: &RecipientEdit) -> ClientResult<Order>;

    /// Soft-cancels the order.
    async fn cancel(&self, order_id: &str) -> ClientResult<Order>;

    async fn orders_for_customer(&self, customer_id: &str) -> ClientResult<Vec<Order>>;

    async fn all_orders(&self, query: &OrderQuery) -> ClientResult<Page<Order>>;
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Asks the gateway for a hosted-checkout URL.
    async fn create_payment_url(&self, request: &PaymentUrlRequest)
        -> ClientResult<PaymentUrlResponse>;
}

#[automock]
#[async_trait]
pub trait InvoiceBackend: Send + Sync {
    async fn create_invoice(&self, invoice: &NewInvoice) -> ClientResult<Invoice>;

    async fn invoice(&self, invoice_id: &str) -> ClientResult<Invoice>;

    async fn invoices(&self, query: &InvoiceQuery) -> ClientResult<Page<Invoice>>;

    /// Replaces the stored invoice with `invoice`.
    async fn update_invoice(&self, invoice: &Invoice) -> ClientResult<Invoice>;

    async fn cancel_invoice(
        &self,
        invoice_id: &str,
        reason: &str,
        performed_by: &str,
    ) -> ClientResult<Invoice>;
}
