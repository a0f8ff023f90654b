use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{InventoryItem, ItemPatch, NewItem};

/// Persistence interface for inventory items, addressed by code.
///
/// Each method is one statement against the store. `insert` must report a
/// collision on the code column as `AppError::DuplicateKey` so callers can
/// retry with a fresh code.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<InventoryItem>>;

    async fn get_by_code(&self, code: &str) -> AppResult<Option<InventoryItem>>;

    async fn exists_by_code(&self, code: &str) -> AppResult<bool>;

    async fn insert(&self, item: &NewItem, code: &str) -> AppResult<InventoryItem>;

    /// Returns `None` when no item has this code.
    async fn update_by_code(
        &self,
        code: &str,
        patch: &ItemPatch,
    ) -> AppResult<Option<InventoryItem>>;

    /// Returns the number of rows removed; zero is not an error.
    async fn delete_by_code(&self, code: &str) -> AppResult<u64>;

    async fn ping(&self) -> AppResult<()>;
}
