//! # Cart Persistence
//!
//! The cart is kept as one JSON blob under a fixed key. The store never
//! interprets storage errors as "empty"; only the blob's content can be
//! corrupt, and [`Cart::restore`](shopfront_core::Cart::restore) handles that.

use async_trait::async_trait;
use tokio::sync::Mutex;

use shopfront_db::{DbResult, LocalStorageRepository, CART_KEY};

/// Where the cart blob lives between runs.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// The stored blob, `None` if nothing was ever saved.
    async fn load(&self) -> DbResult<Option<String>>;

    async fn save(&self, blob: &str) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Cart slot in the `local_storage` table.
#[derive(Debug, Clone)]
pub struct SqliteCartStorage {
    repo: LocalStorageRepository,
}

impl SqliteCartStorage {
    pub fn new(repo: LocalStorageRepository) -> Self {
        SqliteCartStorage { repo }
    }
}

#[async_trait]
impl CartStorage for SqliteCartStorage {
    async fn load(&self) -> DbResult<Option<String>> {
        self.repo.get(CART_KEY).await
    }

    async fn save(&self, blob: &str) -> DbResult<()> {
        self.repo.set(CART_KEY, blob).await
    }
}

// =============================================================================
// Memory
// =============================================================================

/// In-process slot, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `blob` already stored.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemoryCartStorage {
            slot: Mutex::new(Some(blob.into())),
        }
    }

    /// The raw stored blob.
    pub async fn blob(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> DbResult<Option<String>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, blob: &str) -> DbResult<()> {
        *self.slot.lock().await = Some(blob.to_string());
        Ok(())
    }
}
