use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::repository::ItemRepository;
use crate::error::{AppError, AppResult};
use crate::models::{InventoryItem, ItemPatch, NewItem};

/// In-process item store with the same unique-code constraint as the
/// `inventory` table. Backs the unit and HTTP tests.
#[derive(Debug, Default)]
pub struct MemoryItemRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    items: Vec<InventoryItem>,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn list_all(&self) -> AppResult<Vec<InventoryItem>> {
        Ok(self.state.read().await.items.clone())
    }

    async fn get_by_code(&self, code: &str) -> AppResult<Option<InventoryItem>> {
        let state = self.state.read().await;
        Ok(state.items.iter().find(|i| i.code == code).cloned())
    }

    async fn exists_by_code(&self, code: &str) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.items.iter().any(|i| i.code == code))
    }

    async fn insert(&self, item: &NewItem, code: &str) -> AppResult<InventoryItem> {
        let mut state = self.state.write().await;
        if state.items.iter().any(|i| i.code == code) {
            return Err(AppError::DuplicateKey("inventory_qr_code_key".to_string()));
        }

        state.last_id += 1;
        let stored = InventoryItem {
            id: state.last_id,
            name: item.name.clone(),
            quantity: item.quantity,
            code: code.to_string(),
            description: item.description.clone(),
            image_reference: item.image_reference.clone(),
        };
        state.items.push(stored.clone());
        Ok(stored)
    }

    async fn update_by_code(
        &self,
        code: &str,
        patch: &ItemPatch,
    ) -> AppResult<Option<InventoryItem>> {
        let mut state = self.state.write().await;
        Ok(state.items.iter_mut().find(|i| i.code == code).map(|item| {
            patch.apply_to(item);
            item.clone()
        }))
    }

    async fn delete_by_code(&self, code: &str) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|i| i.code != code);
        Ok((before - state.items.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
