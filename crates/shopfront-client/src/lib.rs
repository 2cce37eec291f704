//! # shopfront-client: REST Backend Client for Shopfront
//!
//! Ports for the shop backend plus their HTTP implementation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apps/shopfront services                                                │
//! │       │  Arc<dyn OrderBackend>, Arc<dyn InvoiceBackend>, ...            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               shopfront-client (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ports.rs   ─ CartBackend, OrderBackend, PaymentGateway,       │   │
//! │  │                InvoiceBackend (+ mockall mocks)                 │   │
//! │  │   rest.rs    ─ RestBackend (reqwest, timeout, no retry)         │   │
//! │  │   schema.rs  ─ request/response records, response checks       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼  HTTP/JSON                                                      │
//! │  Shop backend (external)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod rest;
pub mod schema;

pub use config::ApiConfig;
pub use error::{ClientError, ClientResult};
pub use ports::{CartBackend, InvoiceBackend, OrderBackend, PaymentGateway};
pub use rest::RestBackend;
pub use schema::{InvoiceQuery, OrderQuery, Page};
