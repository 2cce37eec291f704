//! # Shopfront Application Library
//!
//! Wires configuration, local storage and the backend client into the
//! storefront and manager services. The `shopfront` binary is a thin CLI
//! over [`App`].
//!
//! ## Module Organization
//! ```text
//! shopfront_app/
//! ├── lib.rs           ◄─── You are here (App wiring, tracing)
//! ├── config.rs        ◄─── AppConfig: TOML file + SHOPFRONT_* env
//! ├── error.rs         ◄─── ApiError / ErrorCode
//! ├── state/
//! │   ├── cart_store.rs ◄── CartStore (Mutex + watch)
//! │   └── storage.rs   ◄─── CartStorage port, SQLite + memory slots
//! └── services/
//!     ├── order.rs     ◄─── OrderLifecycleController
//!     ├── invoice.rs   ◄─── InvoiceManager
//!     ├── export.rs    ◄─── CSV / PDF rendering
//!     └── stats.rs     ◄─── StatsAggregator
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load config ─────────── defaults → shopfront.toml → SHOPFRONT_*     │
//! │  2. Initialize tracing ──── EnvFilter, RUST_LOG overrides               │
//! │  3. Open SQLite ─────────── WAL, run migrations (local_storage table)   │
//! │  4. Build RestBackend ───── base URL + request timeout                  │
//! │  5. Assemble services ───── one backend shared by every port           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shopfront_client::{CartBackend, InvoiceBackend, OrderBackend, PaymentGateway, RestBackend};
use shopfront_core::{Actor, Invoice, Order, OrderStatus, RecipientEdit};
use shopfront_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::{InvoiceManager, OrderLifecycleController, StatsAggregator};
use crate::state::{CartStore, SqliteCartStorage};

/// Every service, sharing one backend and one local database.
pub struct App {
    pub config: AppConfig,
    pub db: Database,
    pub cart: Arc<CartStore>,
    pub orders: OrderLifecycleController,
    pub invoices: InvoiceManager,
    pub stats: StatsAggregator,
}

impl App {
    /// Opens local storage and the REST backend described by `config`.
    pub async fn start(config: AppConfig) -> ApiResult<Self> {
        let db_path = config
            .database_path()
            .map_err(|e| ApiError::internal(e.to_string()))?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        let backend = Arc::new(RestBackend::new(&config.api_config())?);
        info!(base_url = %config.api.base_url, "Backend client ready");

        Ok(Self::assemble(config, db, backend))
    }

    /// Builds the services over any backend implementing every port.
    pub fn assemble<B>(config: AppConfig, db: Database, backend: Arc<B>) -> Self
    where
        B: CartBackend + OrderBackend + PaymentGateway + InvoiceBackend + 'static,
    {
        let storage = Arc::new(SqliteCartStorage::new(db.local_storage()));
        let cart = Arc::new(CartStore::new(storage, Some(backend.clone())));

        App {
            orders: OrderLifecycleController::new(backend.clone(), backend.clone(), cart.clone()),
            invoices: InvoiceManager::new(backend.clone()),
            stats: StatsAggregator::new(backend),
            cart,
            config,
            db,
        }
    }

    /// Approves a Pending order and derives its invoice from the approved
    /// state. A second approval is a `CONFLICT`, so each order gets one
    /// automatic invoice.
    pub async fn approve_order(
        &self,
        order_id: &str,
        edit: &RecipientEdit,
        actor: &Actor,
    ) -> ApiResult<(Order, Invoice)> {
        let order = self.orders.approve_and_snapshot(order_id, edit, actor).await?;
        let invoice = self.invoices.derive_from_order(&order, actor).await?;
        Ok((order, invoice))
    }

    /// Sets an order's status, routing Approved through [`approve_order`](Self::approve_order).
    pub async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        actor: &Actor,
    ) -> ApiResult<(Order, Option<Invoice>)> {
        match status {
            OrderStatus::Approved => {
                let (order, invoice) = self
                    .approve_order(order_id, &RecipientEdit::default(), actor)
                    .await?;
                Ok((order, Some(invoice)))
            }
            _ => {
                let order = self.orders.advance_status(order_id, status, actor).await?;
                Ok((order, None))
            }
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopfront=trace` - Show trace for shopfront crates only
/// - Default: `info,shopfront=debug,sqlx=warn`
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopfront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
