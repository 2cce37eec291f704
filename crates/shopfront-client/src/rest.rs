//! # REST Backend
//!
//! reqwest implementation of every backend port.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  port method (e.g. create_order)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  request(method, &["orders", id]) ── each segment percent-encoded      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  execute(endpoint, RequestBuilder)                                      │
//! │       ├── x-request-id header, debug! span fields                       │
//! │       ├── send (client-wide timeout, no retry)                          │
//! │       ├── read status + body text                                       │
//! │       └── non-2xx → ClientError::Backend { message from body }          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  schema::decode::<T>(endpoint, body)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use uuid::Uuid;

use shopfront_core::{Invoice, NewInvoice, NewOrder, Order, OrderStatus, RecipientEdit};

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::ports::{CartBackend, InvoiceBackend, OrderBackend, PaymentGateway};
use crate::schema::{
    decode, CancelInvoiceRequest, CartResponse, Check, InvoiceQuery, OrderQuery, Page,
    PaymentUrlRequest, PaymentUrlResponse, StatusUpdate,
};

/// HTTP client for the shop backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: Url,
}

impl RestBackend {
    /// Builds a client with the configured timeout.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "Base URL cannot take a path: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            "REST backend client created"
        );

        Ok(RestBackend { client, base_url })
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// id containing `/` or `?` stays a single segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL can take a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }

    /// Sends the request and returns the body of a successful response.
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> ClientResult<String> {
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, endpoint = %endpoint, "Sending request");

        let response = request
            .header("x-request-id", &request_id)
            .send()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(endpoint, e))?;

        debug!(
            request_id = %request_id,
            endpoint = %endpoint,
            status = status.as_u16(),
            bytes = body.len(),
            "Response received"
        );

        if !status.is_success() {
            let err = ClientError::from_status(endpoint, status.as_u16(), &body);
            error!(
                request_id = %request_id,
                endpoint = %endpoint,
                status = status.as_u16(),
                message = ?err.backend_message(),
                "Backend request failed"
            );
            return Err(err);
        }

        Ok(body)
    }

    async fn fetch<T>(&self, endpoint: &str, request: RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned + Check,
    {
        let body = self.execute(endpoint, request).await?;
        decode(endpoint, &body)
    }
}

// =============================================================================
// Port Implementations
// =============================================================================

#[async_trait]
impl CartBackend for RestBackend {
    async fn fetch_cart(&self, customer_id: &str) -> ClientResult<Vec<serde_json::Value>> {
        let request = self
            .request(Method::GET, &["cart"])
            .query(&[("userId", customer_id)]);
        let cart: CartResponse = self.fetch("GET /cart", request).await?;
        Ok(cart.items)
    }
}

#[async_trait]
impl OrderBackend for RestBackend {
    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        let request = self.request(Method::POST, &["addOrder"]).json(order);
        self.fetch("POST /addOrder", request).await
    }

    async fn order(&self, order_id: &str) -> ClientResult<Order> {
        let request = self.request(Method::GET, &["orders", order_id]);
        self.fetch("GET /orders/:id", request).await
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        let request = self
            .request(Method::PUT, &["updateOrder", order_id])
            .json(&StatusUpdate { status });
        self.fetch("PUT /updateOrder/:id", request).await
    }

    async fn approve(&self, order_id: &str, edit: &RecipientEdit) -> ClientResult<Order> {
        let request = self
            .request(Method::PUT, &["approveOrder", order_id])
            .json(edit);
        self.fetch("PUT /approveOrder/:id", request).await
    }

    async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        let request = self.request(Method::DELETE, &["deleteOrder", order_id]);
        self.fetch("DELETE /deleteOrder/:id", request).await
    }

    async fn orders_for_customer(&self, customer_id: &str) -> ClientResult<Vec<Order>> {
        let request = self.request(Method::GET, &["orders", "user", customer_id]);
        self.fetch("GET /orders/user/:id", request).await
    }

    async fn all_orders(&self, query: &OrderQuery) -> ClientResult<Page<Order>> {
        let request = self
            .request(Method::GET, &["allOrders"])
            .query(&query.to_params());
        self.fetch("GET /allOrders", request).await
    }
}

#[async_trait]
impl PaymentGateway for RestBackend {
    async fn create_payment_url(
        &self,
        payment: &PaymentUrlRequest,
    ) -> ClientResult<PaymentUrlResponse> {
        let request = self.request(Method::POST, &["create_payment_url"]).json(payment);
        self.fetch("POST /create_payment_url", request).await
    }
}

#[async_trait]
impl InvoiceBackend for RestBackend {
    async fn create_invoice(&self, invoice: &NewInvoice) -> ClientResult<Invoice> {
        let request = self.request(Method::POST, &["invoices"]).json(invoice);
        self.fetch("POST /invoices", request).await
    }

    async fn invoice(&self, invoice_id: &str) -> ClientResult<Invoice> {
        let request = self.request(Method::GET, &["invoices", invoice_id]);
        self.fetch("GET /invoices/:id", request).await
    }

    async fn invoices(&self, query: &InvoiceQuery) -> ClientResult<Page<Invoice>> {
        let request = self
            .request(Method::GET, &["invoices"])
            .query(&query.to_params());
        self.fetch("GET /invoices", request).await
    }

    async fn update_invoice(&self, invoice: &Invoice) -> ClientResult<Invoice> {
        let request = self
            .request(Method::PUT, &["invoices", invoice.id.as_str()])
            .json(invoice);
        self.fetch("PUT /invoices/:id", request).await
    }

    async fn cancel_invoice(
        &self,
        invoice_id: &str,
        reason: &str,
        performed_by: &str,
    ) -> ClientResult<Invoice> {
        let body = CancelInvoiceRequest {
            reason: reason.to_string(),
            performed_by: performed_by.to_string(),
        };
        let request = self
            .request(Method::POST, &["invoices", "cancel", invoice_id])
            .json(&body);
        self.fetch("POST /invoices/cancel/:id", request).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
