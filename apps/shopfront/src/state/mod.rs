//! # State Module
//!
//! Process-local state of the storefront session.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         CartStore                                │  │
//! │  │                                                                  │  │
//! │  │  tokio::Mutex<Cart> ─── every mutation serialised, issue order  │  │
//! │  │  watch::Sender<u64> ─── "cart changed" revision, no payload     │  │
//! │  │         │                                                        │  │
//! │  │         ├──► Arc<dyn CartStorage>  (SQLite slot | memory)        │  │
//! │  │         └──► Arc<dyn CartBackend>  (server cart on login)        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartStore is Send + Sync; share it behind an Arc                    │
//! │  • Subscribers never block writers: watch keeps only the latest value  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart_store;
mod storage;

pub use cart_store::CartStore;
pub use storage::{CartStorage, MemoryCartStorage, SqliteCartStorage};
