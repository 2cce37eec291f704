//! # Repository Module
//!
//! Database repository implementations for Shopfront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteCartStorage (apps/shopfront)                                     │
//! │       │                                                                 │
//! │       │  db.local_storage().get("cart")                                 │
//! │       ▼                                                                 │
//! │  LocalStorageRepository                                                 │
//! │  ├── get(&self, key)                                                    │
//! │  ├── set(&self, key, value)                                             │
//! │  ├── remove(&self, key)                                                 │
//! │  └── keys(&self)                                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LocalStorageRepository`](local_storage::LocalStorageRepository) - key/value blobs

pub mod local_storage;
