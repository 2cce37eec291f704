//! # Cart Store
//!
//! Owns the storefront cart: local persistence, reconciliation with the
//! server cart at login, and the "cart changed" notification.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action              CartStore               Effect                  │
//! │  ─────────              ─────────               ──────                  │
//! │                                                                         │
//! │  Add to cart ─────────► add_item() ───────────► merge by key, save     │
//! │  +/- buttons ─────────► set_quantity() ───────► max(1, q + delta), save│
//! │  Remove ──────────────► remove_item() ────────► delete line, save      │
//! │  Checkout ────────────► remove_ordered() ─────► take ordered qty, save │
//! │  Logout ──────────────► clear() ──────────────► empty, save            │
//! │  App start / login ───► load(identity) ───────► restore, reconcile     │
//! │                                                                         │
//! │  Every change bumps the watch revision once. Subscribers re-read       │
//! │  snapshot(); several quick changes may arrive as one wake-up.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reconciliation at Login
//! ```text
//!   local blob ──restore──► local cart
//!                               │
//!              ┌────────────────┴─────────────────┐
//!         non-empty                             empty + customer
//!              │                                    │
//!        keep local (wins)              GET /cart?userId= ──► replace + save
//!                                                   (invalid entries dropped,
//!                                                    the rest adopted)
//! ```

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use shopfront_client::CartBackend;
use shopfront_core::cart::CartTotals;
use shopfront_core::{Cart, CartLine, CartLineKey, Identity};

use crate::error::{ApiError, ApiResult};
use crate::state::CartStorage;

/// The storefront cart plus its persistence and change feed.
pub struct CartStore {
    cart: Mutex<Cart>,
    storage: Arc<dyn CartStorage>,
    /// Absent for guest-only sessions.
    backend: Option<Arc<dyn CartBackend>>,
    revision: watch::Sender<u64>,
}

impl CartStore {
    /// Creates an empty store. Call [`load`](Self::load) to restore a session.
    pub fn new(storage: Arc<dyn CartStorage>, backend: Option<Arc<dyn CartBackend>>) -> Self {
        let (revision, _) = watch::channel(0);
        CartStore {
            cart: Mutex::new(Cart::new()),
            storage,
            backend,
            revision,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn totals(&self) -> CartTotals {
        CartTotals::from(&*self.cart.lock().await)
    }

    /// Receives the revision number after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of changes so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a line, merging into an existing line with the same key.
    ///
    /// Returns `Ok(false)` when the line is invalid; the cart is untouched
    /// and the rejection is logged.
    pub async fn add_item(&self, line: CartLine) -> ApiResult<bool> {
        let mut cart = self.cart.lock().await;
        let mut next = cart.clone();

        if let Err(e) = next.add_line(line.clone()) {
            warn!(product_id = %line.product_id, reason = %e, "Rejected cart line");
            return Ok(false);
        }

        self.commit(&mut cart, next).await?;
        debug!(product_id = %line.product_id, quantity = line.quantity, "Added to cart");
        Ok(true)
    }

    /// Removes the line for this product variant. Absent lines are a no-op.
    pub async fn remove_item(&self, product_id: &str, size: &str, color: &str) -> ApiResult<bool> {
        let key = CartLineKey::new(product_id, color, size);
        let mut cart = self.cart.lock().await;
        let mut next = cart.clone();

        if !next.remove(&key) {
            debug!(?key, "Remove of absent cart line ignored");
            return Ok(false);
        }

        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    /// Changes a line's quantity by `delta`, never below 1.
    pub async fn set_quantity(&self, key: &CartLineKey, delta: i64) -> ApiResult<bool> {
        let mut cart = self.cart.lock().await;
        let mut next = cart.clone();

        if !next.adjust_quantity(key, delta) {
            debug!(?key, "Quantity change for absent cart line ignored");
            return Ok(false);
        }

        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    /// Takes the lines of a placed order out of the cart.
    ///
    /// Lines added after the order snapshot was taken stay in the cart.
    pub async fn remove_ordered(&self, ordered: &[CartLine]) -> ApiResult<bool> {
        let mut cart = self.cart.lock().await;
        let mut next = cart.clone();

        if !next.remove_ordered(ordered) {
            debug!("Ordered lines already gone from cart");
            return Ok(false);
        }

        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    /// Empties the cart.
    pub async fn clear(&self) -> ApiResult<()> {
        let mut cart = self.cart.lock().await;
        self.commit(&mut cart, Cart::new()).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        info!("Clearing cart on logout");
        self.clear().await
    }

    /// Restores the persisted cart and, for a customer with nothing stored
    /// locally, adopts the server cart.
    ///
    /// Corrupt or partially invalid blobs are repaired and logged, never
    /// reported as errors.
    pub async fn load(&self, identity: &Identity) -> ApiResult<Cart> {
        let mut cart = self.cart.lock().await;

        let blob = self.storage.load().await?;
        let mut restored = match blob.as_deref() {
            Some(blob) => Cart::restore(blob),
            None => Default::default(),
        };

        if let Some(reason) = &restored.corrupt {
            warn!(%reason, "Stored cart is corrupt, starting empty");
        }
        for dropped in &restored.dropped {
            warn!(index = dropped.index, reason = %dropped.reason, "Dropped invalid stored cart line");
        }
        if restored.needs_rewrite() {
            self.persist(&restored.cart).await?;
        }

        let mut next = std::mem::take(&mut restored.cart);

        if let (Identity::Customer { customer_id }, Some(backend)) = (identity, &self.backend) {
            if next.is_empty() {
                let entries = backend.fetch_cart(customer_id).await?;
                let adopted = Cart::from_entries(entries);
                for dropped in &adopted.dropped {
                    warn!(%customer_id, index = dropped.index, reason = %dropped.reason, "Dropped invalid server cart line");
                }
                next = adopted.cart;
                info!(%customer_id, lines = next.line_count(), "Adopted server cart");
                self.persist(&next).await?;
            } else {
                debug!(%customer_id, "Local cart not empty, server cart skipped");
            }
        }

        *cart = next;
        self.notify();
        Ok(cart.clone())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Saves `next`, then makes it current and notifies.
    ///
    /// A failed save leaves the in-memory cart unchanged.
    async fn commit(&self, current: &mut Cart, next: Cart) -> ApiResult<()> {
        self.persist(&next).await?;
        *current = next;
        self.notify();
        Ok(())
    }

    async fn persist(&self, cart: &Cart) -> ApiResult<()> {
        let blob = cart
            .to_blob()
            .map_err(|e| ApiError::internal(format!("Failed to encode cart: {}", e)))?;
        self.storage.save(&blob).await?;
        Ok(())
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
