//! # Order Lifecycle Controller
//!
//! Checkout on the storefront side, status changes on the manager side.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   place_order                                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┐  approve   ┌──────────┐        ┌──────────┐   ┌─────────┐│
//! │   │ Pending │──────────►│ Approved │──────►│ Shipping │──►│Delivered││
//! │   └────┬────┘            └────┬─────┘        └──────────┘   └─────────┘│
//! │        │ cancel (staff)       │ cancel (staff)                          │
//! │        ▼                      ▼                                         │
//! │   ┌─────────────────────────────┐                                      │
//! │   │          Cancelled          │   (soft: the order is never deleted) │
//! │   └─────────────────────────────┘                                      │
//! │                                                                         │
//! │  approve only from Pending. advance_status sets any other status.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout with a Redirect Gateway
//! ```text
//!   POST /addOrder ──► order (Pending)
//!         │
//!   POST /create_payment_url {orderId, amount}
//!         │
//!    success? ──no──► error, cart kept, order stays Pending
//!         │yes
//!   take ordered lines out of the cart, return payment URL
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use shopfront_client::schema::PaymentUrlRequest;
use shopfront_client::{ClientError, OrderBackend, OrderQuery, Page, PaymentGateway};
use shopfront_core::order::{
    build_new_order, plan_approve, plan_cancel, require_staff, validate_recipient_edit, CancelPlan,
};
use shopfront_core::{Actor, CoreError, Order, OrderStatus, PaymentMethod, RecipientEdit, ShippingInfo};

use crate::error::{ApiError, ApiResult};
use crate::state::CartStore;

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub order: Order,
    /// Where to send the customer for redirect-gateway payments.
    pub payment_url: Option<String>,
}

impl Placement {
    pub fn order_id(&self) -> &str {
        &self.order.id
    }
}

pub struct OrderLifecycleController {
    orders: Arc<dyn OrderBackend>,
    payments: Arc<dyn PaymentGateway>,
    cart: Arc<CartStore>,
}

impl OrderLifecycleController {
    pub fn new(
        orders: Arc<dyn OrderBackend>,
        payments: Arc<dyn PaymentGateway>,
        cart: Arc<CartStore>,
    ) -> Self {
        OrderLifecycleController {
            orders,
            payments,
            cart,
        }
    }

    // =========================================================================
    // Storefront
    // =========================================================================

    /// Turns the current cart into a Pending order.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` / `CART_ERROR` before any request when shipping
    ///   fields are blank or the cart is empty
    /// - `PAYMENT_ERROR` when the gateway refuses; the order stays Pending
    ///   and the cart is kept so the customer can retry
    pub async fn place_order(
        &self,
        customer_id: &str,
        shipping: &ShippingInfo,
        payment_method: PaymentMethod,
    ) -> ApiResult<Placement> {
        let cart = self.cart.snapshot().await;
        let new_order = build_new_order(customer_id, &cart, shipping, payment_method)?;

        let order = self.orders.create_order(&new_order).await?;
        info!(
            order_id = %order.id,
            %customer_id,
            total = order.total_amount.dong(),
            method = payment_method.as_str(),
            "Order placed"
        );

        let payment_url = if payment_method.is_redirect_gateway() {
            Some(self.acquire_payment_url(&order).await?)
        } else {
            None
        };

        self.cart.remove_ordered(cart.lines()).await?;
        Ok(Placement { order, payment_url })
    }

    async fn acquire_payment_url(&self, order: &Order) -> ApiResult<String> {
        let request = PaymentUrlRequest {
            order_id: order.id.clone(),
            amount: order.total_amount,
        };
        let response = self.payments.create_payment_url(&request).await?;

        match response.payment_url.filter(|_| response.success) {
            Some(url) => {
                debug!(order_id = %order.id, "Payment URL acquired");
                Ok(url)
            }
            None => {
                warn!(order_id = %order.id, "Payment gateway refused, cart kept");
                Err(ClientError::PaymentRefused {
                    order_id: order.id.clone(),
                    message: response.message,
                }
                .into())
            }
        }
    }

    pub async fn orders_for_customer(&self, customer_id: &str) -> ApiResult<Vec<Order>> {
        Ok(self.orders.orders_for_customer(customer_id).await?)
    }

    pub async fn order(&self, order_id: &str) -> ApiResult<Order> {
        Ok(self.orders.order(order_id).await?)
    }

    // =========================================================================
    // Manager
    // =========================================================================

    /// Sets any status except Approved, which goes through
    /// [`approve_and_snapshot`](Self::approve_and_snapshot). Staff only.
    pub async fn advance_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        actor: &Actor,
    ) -> ApiResult<Order> {
        require_staff(actor, "change order status")?;
        if let OrderStatus::Unknown(code) = status {
            return Err(ApiError::validation(format!("Unknown order status code {}", code)));
        }
        if status == OrderStatus::Approved {
            return Err(ApiError::validation(
                "Orders are approved through approval, not a status change",
            ));
        }

        let order = self.orders.update_status(order_id, status).await?;
        info!(%order_id, status = %status, by = actor.display_name(), "Order status changed");
        Ok(order)
    }

    /// Soft-cancels a Pending or Approved order. Staff only.
    ///
    /// Cancelling an already cancelled order succeeds without a request.
    pub async fn cancel(&self, order_id: &str, actor: &Actor) -> ApiResult<Order> {
        require_staff(actor, "cancel orders")?;

        let current = self.orders.order(order_id).await?;
        match plan_cancel(&current)? {
            CancelPlan::AlreadyCancelled => {
                debug!(%order_id, "Order already cancelled");
                Ok(current)
            }
            CancelPlan::Cancel => {
                let order = self.orders.cancel(order_id).await?;
                info!(%order_id, by = actor.display_name(), "Order cancelled");
                Ok(order)
            }
        }
    }

    /// Applies recipient corrections and approves a Pending order. Staff only.
    ///
    /// Any other current status is a `CONFLICT` and sends nothing.
    pub async fn approve_and_snapshot(
        &self,
        order_id: &str,
        edit: &RecipientEdit,
        actor: &Actor,
    ) -> ApiResult<Order> {
        require_staff(actor, "approve orders")?;
        validate_recipient_edit(edit).map_err(CoreError::from)?;

        let current = self.orders.order(order_id).await?;
        plan_approve(&current)?;

        let order = self.orders.approve(order_id, edit).await?;
        info!(%order_id, by = actor.display_name(), "Order approved");
        Ok(order)
    }

    /// Paginated order list for the manager. Staff only.
    pub async fn all_orders(&self, query: &OrderQuery, actor: &Actor) -> ApiResult<Page<Order>> {
        require_staff(actor, "list all orders")?;
        Ok(self.orders.all_orders(query).await?)
    }
}
