//! # shopfront-core: Pure Business Logic for Shopfront
//!
//! This crate is the **heart** of Shopfront. It contains the cart, order,
//! invoice and statistics rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Storefront SPA            Manager SPA                  │   │
//! │  │    Cart ──► Checkout ──► Tracking   Orders ──► Invoices ──► Stats│  │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        apps/shopfront (CartStore, controllers, export)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopfront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────────┐  │   │
//! │  │   │ money  │ │  cart  │ │ order  │ │ invoice │ │   stats    │  │   │
//! │  │   └────────┘ └────────┘ └────────┘ └─────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (CartLine, Order, Invoice, statuses)
//! - [`money`] - Money type with integer arithmetic (đồng, no floats)
//! - [`cart`] - Cart merge/clamp rules and persisted-blob recovery
//! - [`order`] - Checkout snapshot, shipping fee and status rules
//! - [`invoice`] - Financials and the Active/Cancelled lifecycle
//! - [`stats`] - Dashboard rollups over invoices
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfront_core::money::Money;
//! use shopfront_core::order::shipping_fee;
//!
//! assert_eq!(shipping_fee(Money::from_dong(199_999)), Money::from_dong(25_000));
//! assert_eq!(shipping_fee(Money::from_dong(200_000)), Money::zero());
//! ```

pub mod cart;
pub mod error;
pub mod invoice;
pub mod money;
pub mod order;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Orders with a subtotal below this amount pay [`SHIPPING_FEE`].
///
/// The boundary is inclusive: a subtotal of exactly 200 000 ships free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_dong(200_000);

/// Flat delivery fee charged below [`FREE_SHIPPING_THRESHOLD`].
pub const SHIPPING_FEE: Money = Money::from_dong(25_000);

/// Maximum quantity of a single cart line or invoice product.
///
/// Guards against typing 1000 instead of 10, and keeps line totals far from
/// the `i64` range.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price of a cart line or invoice product (1 tỷ đồng).
pub const MAX_UNIT_PRICE: Money = Money::from_dong(1_000_000_000);

/// Display label for any status value the client does not recognise.
pub const UNKNOWN_STATUS_LABEL: &str = "Không xác định";
