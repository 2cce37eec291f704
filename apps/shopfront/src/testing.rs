//! In-memory backend and fixtures shared by the service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use shopfront_client::schema::{PaymentUrlRequest, PaymentUrlResponse};
use shopfront_client::{
    CartBackend, ClientError, ClientResult, InvoiceBackend, InvoiceQuery, OrderBackend,
    OrderQuery, Page, PaymentGateway,
};
use crate::state::CartStore;
use shopfront_core::{
    CartLine, CustomerInfo, Invoice, InvoiceLog, InvoiceProduct, InvoiceStatus, LogAction, Money,
    NewInvoice, NewOrder, Order, OrderStatus, RecipientEdit, ShippingInfo,
};

// =============================================================================
// Fixtures
// =============================================================================

pub fn cart_line(id: &str, color: &str, size: &str, price: i64, quantity: i64) -> CartLine {
    CartLine {
        product_id: id.to_string(),
        product_name: format!("Sản phẩm {}", id),
        unit_price: Money::from_dong(price),
        quantity,
        color: color.to_string(),
        size: size.to_string(),
        image: format!("https://cdn.shop.vn/{}.jpg", id),
    }
}

pub fn shipping_info() -> ShippingInfo {
    ShippingInfo {
        recipient_name: "Trần Thị B".to_string(),
        phone: "0912345678".to_string(),
        street: "12 Lê Lợi".to_string(),
        ward: "Phường Bến Nghé".to_string(),
        district: "Quận 1".to_string(),
        province: "TP. Hồ Chí Minh".to_string(),
        note: None,
    }
}

pub fn customer_info() -> CustomerInfo {
    CustomerInfo {
        name: "Lê Văn C".to_string(),
        phone: "0901234567".to_string(),
        address: "45 Nguyễn Huệ, Quận 1, TP. Hồ Chí Minh".to_string(),
        email: Some("c.le@example.vn".to_string()),
    }
}

pub fn invoice_product(id: &str, price: i64, quantity: i64, tax: i64, discount: i64) -> InvoiceProduct {
    InvoiceProduct {
        product_id: id.to_string(),
        name: format!("Sản phẩm {}", id),
        quantity,
        unit_price: Money::from_dong(price),
        tax: Money::from_dong(tax),
        discount: Money::from_dong(discount),
        color: None,
        size: None,
    }
}

/// What the backend stores for a new order.
pub fn order_from(new_order: &NewOrder, id: &str) -> Order {
    Order {
        id: id.to_string(),
        customer_id: new_order.customer_id.clone(),
        placed_at: fixed_now(),
        status: OrderStatus::Pending,
        recipient_name: new_order.recipient_name.clone(),
        phone: new_order.phone.clone(),
        delivery_address: new_order.delivery_address.clone(),
        note: new_order.note.clone(),
        payment_method: new_order.payment_method,
        shipping_fee: new_order.shipping_fee,
        total_amount: new_order.total_amount,
        items: new_order.items.clone(),
    }
}

pub fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 3, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Default)]
struct State {
    carts: HashMap<String, Vec<serde_json::Value>>,
    orders: Vec<Order>,
    invoices: Vec<Invoice>,
    payment_refusal: Option<String>,
    calls: Vec<&'static str>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// A stateful stand-in for the REST backend, implementing every port.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    /// Added to this cart while `addOrder` is in flight.
    checkout_race: Mutex<Option<(Arc<CartStore>, CartLine)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_server_cart(&self, customer_id: &str, lines: Vec<CartLine>) {
        let entries = lines
            .iter()
            .map(|line| serde_json::to_value(line).unwrap())
            .collect();
        self.set_server_cart_entries(customer_id, entries).await;
    }

    /// Serves raw `/cart` entries, valid or not.
    pub async fn set_server_cart_entries(&self, customer_id: &str, entries: Vec<serde_json::Value>) {
        self.state
            .lock()
            .await
            .carts
            .insert(customer_id.to_string(), entries);
    }

    /// The next `addOrder` adds `line` to `cart` before it answers.
    pub async fn add_to_cart_during_checkout(&self, cart: Arc<CartStore>, line: CartLine) {
        *self.checkout_race.lock().await = Some((cart, line));
    }

    /// Makes the payment gateway answer `success: false`.
    pub async fn refuse_payments(&self, message: &str) {
        self.state.lock().await.payment_refusal = Some(message.to_string());
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }

    pub async fn stored_invoice(&self, invoice_id: &str) -> Option<Invoice> {
        self.state
            .lock()
            .await
            .invoices
            .iter()
            .find(|i| i.id == invoice_id)
            .cloned()
    }

    /// Stores an invoice as-is, bypassing the services.
    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.state.lock().await.invoices.push(invoice);
    }

    /// How many times an endpoint was hit, by its path name.
    pub async fn call_count(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| **c == endpoint)
            .count()
    }
}

fn not_found(endpoint: &str) -> ClientError {
    ClientError::Backend {
        endpoint: endpoint.to_string(),
        status: 404,
        message: Some("Không tìm thấy".to_string()),
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: u32, limit: u32) -> Page<T> {
    let limit = limit.max(1);
    let total = items.len() as u64;
    let total_pages = ((items.len() as u32 + limit - 1) / limit).max(1);
    let data = items
        .into_iter()
        .skip(((page.max(1) - 1) * limit) as usize)
        .take(limit as usize)
        .collect();
    Page {
        data,
        page: page.max(1),
        total_pages,
        total,
    }
}

#[async_trait]
impl CartBackend for FakeBackend {
    async fn fetch_cart(&self, customer_id: &str) -> ClientResult<Vec<serde_json::Value>> {
        let mut state = self.state.lock().await;
        state.calls.push("cart");
        Ok(state.carts.get(customer_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OrderBackend for FakeBackend {
    async fn create_order(&self, order: &NewOrder) -> ClientResult<Order> {
        let race = self.checkout_race.lock().await.take();
        if let Some((cart, line)) = race {
            cart.add_item(line).await.unwrap();
        }

        let mut state = self.state.lock().await;
        state.calls.push("addOrder");
        let id = state.next_id("ORD");
        let stored = order_from(order, &id);
        state.orders.push(stored.clone());
        Ok(stored)
    }

    async fn order(&self, order_id: &str) -> ClientResult<Order> {
        let mut state = self.state.lock().await;
        state.calls.push("orders");
        state
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| not_found("/orders"))
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<Order> {
        let mut state = self.state.lock().await;
        state.calls.push("updateOrder");
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| not_found("/updateOrder"))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn approve(&self, order_id: &str, edit: &RecipientEdit) -> ClientResult<Order> {
        let mut state = self.state.lock().await;
        state.calls.push("approveOrder");
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| not_found("/approveOrder"))?;
        if let Some(name) = &edit.recipient_name {
            order.recipient_name = name.clone();
        }
        if let Some(phone) = &edit.phone {
            order.phone = phone.clone();
        }
        if let Some(address) = &edit.delivery_address {
            order.delivery_address = address.clone();
        }
        if edit.note.is_some() {
            order.note = edit.note.clone();
        }
        order.status = OrderStatus::Approved;
        Ok(order.clone())
    }

    async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        let mut state = self.state.lock().await;
        state.calls.push("deleteOrder");
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| not_found("/deleteOrder"))?;
        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }

    async fn orders_for_customer(&self, customer_id: &str) -> ClientResult<Vec<Order>> {
        let mut state = self.state.lock().await;
        state.calls.push("orders/user");
        Ok(state
            .orders
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn all_orders(&self, query: &OrderQuery) -> ClientResult<Page<Order>> {
        let mut state = self.state.lock().await;
        state.calls.push("allOrders");
        let matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok(paginate(matching, query.page, query.limit))
    }
}

#[async_trait]
impl PaymentGateway for FakeBackend {
    async fn create_payment_url(&self, request: &PaymentUrlRequest) -> ClientResult<PaymentUrlResponse> {
        let mut state = self.state.lock().await;
        state.calls.push("create_payment_url");
        Ok(match &state.payment_refusal {
            Some(message) => PaymentUrlResponse {
                success: false,
                payment_url: None,
                message: Some(message.clone()),
            },
            None => PaymentUrlResponse {
                success: true,
                payment_url: Some(format!(
                    "https://sandbox.vnpayment.vn/pay?orderId={}&amount={}",
                    request.order_id,
                    request.amount.dong()
                )),
                message: None,
            },
        })
    }
}

#[async_trait]
impl InvoiceBackend for FakeBackend {
    async fn create_invoice(&self, invoice: &NewInvoice) -> ClientResult<Invoice> {
        let mut state = self.state.lock().await;
        state.calls.push("createInvoice");
        let id = state.next_id("INV");
        let created_at = invoice
            .logs
            .first()
            .map(|l| l.timestamp)
            .unwrap_or_else(fixed_now);
        let stored = Invoice {
            id,
            order_id: invoice.order_id.clone(),
            customer: invoice.customer.clone(),
            products: invoice.products.clone(),
            payment_method: invoice.payment_method,
            payment_status: invoice.payment_status.clone(),
            status: invoice.status.clone(),
            financials: invoice.financials,
            created_type: invoice.created_type,
            logs: invoice.logs.clone(),
            created_at,
            updated_at: created_at,
        };
        state.invoices.push(stored.clone());
        Ok(stored)
    }

    async fn invoice(&self, invoice_id: &str) -> ClientResult<Invoice> {
        let mut state = self.state.lock().await;
        state.calls.push("invoice");
        state
            .invoices
            .iter()
            .find(|i| i.id == invoice_id)
            .cloned()
            .ok_or_else(|| not_found("/invoices"))
    }

    async fn invoices(&self, query: &InvoiceQuery) -> ClientResult<Page<Invoice>> {
        let mut state = self.state.lock().await;
        state.calls.push("invoices");
        let matching: Vec<Invoice> = state
            .invoices
            .iter()
            .filter(|i| query.status.as_ref().map_or(true, |s| &i.status == s))
            .filter(|i| {
                query
                    .payment_status
                    .as_ref()
                    .map_or(true, |s| &i.payment_status == s)
            })
            .cloned()
            .collect();
        Ok(paginate(matching, query.page, query.limit))
    }

    async fn update_invoice(&self, invoice: &Invoice) -> ClientResult<Invoice> {
        let mut state = self.state.lock().await;
        state.calls.push("updateInvoice");
        let stored = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice.id)
            .ok_or_else(|| not_found("/invoices"))?;
        *stored = invoice.clone();
        Ok(stored.clone())
    }

    async fn cancel_invoice(
        &self,
        invoice_id: &str,
        reason: &str,
        performed_by: &str,
    ) -> ClientResult<Invoice> {
        let mut state = self.state.lock().await;
        state.calls.push("cancelInvoice");
        let stored = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice_id)
            .ok_or_else(|| not_found("/invoices/cancel"))?;
        if stored.status != InvoiceStatus::Active {
            return Err(ClientError::Backend {
                endpoint: "/invoices/cancel".to_string(),
                status: 409,
                message: Some("Hóa đơn đã bị hủy".to_string()),
            });
        }
        stored.status = InvoiceStatus::Cancelled;
        stored.logs.push(InvoiceLog {
            action: LogAction::Cancelled,
            note: reason.to_string(),
            timestamp: fixed_now(),
            performed_by: performed_by.to_string(),
        });
        Ok(stored.clone())
    }
}
