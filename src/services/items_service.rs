use std::sync::Arc;

use crate::db::ItemRepository;
use crate::error::{AppError, AppResult};
use crate::models::{CreateItemRequest, InventoryItem, ItemPatch};
use crate::services::code_generator::CodeGenerator;
use crate::services::code_resolver::CodeResolver;

const ITEM_NOT_FOUND: &str = "Item not found";

/// Inventory operations behind the HTTP handlers.
///
/// Owns code assignment on create: the resolver picks a free code and the
/// insert is retried with a fresh one when the unique constraint still fires.
pub struct ItemsService {
    repository: Arc<dyn ItemRepository>,
    resolver: CodeResolver,
}

impl ItemsService {
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: u32,
    ) -> Self {
        let resolver = CodeResolver::new(repository.clone(), generator, max_attempts);
        Self {
            repository,
            resolver,
        }
    }

    pub async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        self.repository.list_all().await
    }

    pub async fn get_item(&self, code: &str) -> AppResult<InventoryItem> {
        self.repository
            .get_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))
    }

    /// Validates the request, assigns a unique code and inserts the row.
    ///
    /// A unique violation on insert means another request claimed the same code
    /// between our check and our insert; the code is re-resolved and the insert
    /// retried, up to the resolver's attempt limit.
    pub async fn create_item(&self, req: CreateItemRequest) -> AppResult<InventoryItem> {
        let item = req.validate()?;

        tracing::info!(
            "CreateItem called: name={}, quantity={}, requested_code={:?}",
            item.name,
            item.quantity,
            item.requested_code
        );

        let mut requested = item.requested_code.as_deref();
        let mut conflicts = 0u32;
        loop {
            let code = self.resolver.resolve(requested).await?;

            match self.repository.insert(&item, &code).await {
                Ok(stored) => {
                    tracing::info!("Inserted item: id={}, code={}", stored.id, stored.code);
                    return Ok(stored);
                }
                Err(AppError::DuplicateKey(constraint)) => {
                    conflicts += 1;
                    tracing::warn!(
                        "Insert lost a race on {}: code={}, conflicts={}/{}",
                        constraint,
                        code,
                        conflicts,
                        self.resolver.max_attempts()
                    );
                    if conflicts >= self.resolver.max_attempts() {
                        return Err(AppError::ResolutionExhausted {
                            attempts: conflicts,
                        });
                    }
                    // The code is now known to be taken, so only generated codes from here on.
                    requested = None;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn update_item(&self, code: &str, patch: ItemPatch) -> AppResult<InventoryItem> {
        patch.validate()?;

        tracing::info!(
            "UpdateItem called: code={}, name={:?}, quantity={:?}",
            code,
            patch.name,
            patch.quantity
        );

        self.repository
            .update_by_code(code, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))
    }

    pub async fn update_quantity(&self, code: &str, quantity: i32) -> AppResult<InventoryItem> {
        self.update_item(code, ItemPatch::quantity_only(quantity)).await
    }

    /// Deleting a code that does not exist is still a success.
    pub async fn delete_item(&self, code: &str) -> AppResult<()> {
        let rows_affected = self.repository.delete_by_code(code).await?;
        tracing::info!("DeleteItem: code={}, rows_affected={}", code, rows_affected);
        Ok(())
    }

    pub async fn check_store(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryItemRepository;
    use crate::models::NewItem;
    use crate::services::code_generator::UuidCodeGenerator;
    use crate::services::code_resolver::tests::ScriptedGenerator;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn service() -> ItemsService {
        ItemsService::new(
            Arc::new(MemoryItemRepository::new()),
            Arc::new(UuidCodeGenerator),
            10,
        )
    }

    fn request(name: &str, quantity: i32, code: Option<&str>) -> CreateItemRequest {
        CreateItemRequest {
            name: Some(name.to_string()),
            quantity: Some(quantity),
            code: code.map(str::to_string),
            ..Default::default()
        }
    }

    /// Reports a unique violation for the first `conflicts` inserts, as if a
    /// concurrent request had claimed the code after our existence check.
    struct RacingRepository {
        inner: MemoryItemRepository,
        conflicts: AtomicU32,
    }

    impl RacingRepository {
        fn new(conflicts: u32) -> Self {
            Self {
                inner: MemoryItemRepository::new(),
                conflicts: AtomicU32::new(conflicts),
            }
        }
    }

    #[async_trait]
    impl ItemRepository for RacingRepository {
        async fn list_all(&self) -> AppResult<Vec<InventoryItem>> {
            self.inner.list_all().await
        }

        async fn get_by_code(&self, code: &str) -> AppResult<Option<InventoryItem>> {
            self.inner.get_by_code(code).await
        }

        async fn exists_by_code(&self, code: &str) -> AppResult<bool> {
            self.inner.exists_by_code(code).await
        }

        async fn insert(&self, item: &NewItem, code: &str) -> AppResult<InventoryItem> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Err(AppError::DuplicateKey("inventory_qr_code_key".into()));
            }
            self.inner.insert(item, code).await
        }

        async fn update_by_code(
            &self,
            code: &str,
            patch: &ItemPatch,
        ) -> AppResult<Option<InventoryItem>> {
            self.inner.update_by_code(code, patch).await
        }

        async fn delete_by_code(&self, code: &str) -> AppResult<u64> {
            self.inner.delete_by_code(code).await
        }

        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_blank_code_gets_generated_and_is_retrievable() {
        let service = service();
        let created = service
            .create_item(request("Widget", 5, Some("")))
            .await
            .unwrap();
        assert!(!created.code.is_empty());

        let fetched = service.get_item(&created.code).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_codes_stay_unique_across_creates() {
        let service = service();
        let mut codes = HashSet::new();
        for i in 0..25 {
            let code = match i % 3 {
                0 => None,
                1 => Some(""),
                _ => Some("   "),
            };
            let item = service.create_item(request("Bolt", i, code)).await.unwrap();
            assert!(codes.insert(item.code));
        }
        assert_eq!(service.list_items().await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_duplicate_requested_code_gets_new_code() {
        let service = service();
        let first = service
            .create_item(request("Widget", 1, Some("A1")))
            .await
            .unwrap();
        let second = service
            .create_item(request("Widget", 1, Some("A1")))
            .await
            .unwrap();
        assert_eq!(first.code, "A1");
        assert_ne!(second.code, "A1");
        assert_eq!(service.get_item("A1").await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_round_trip_keeps_all_fields() {
        let service = service();
        let req = CreateItemRequest {
            name: Some("Camera".into()),
            quantity: Some(2),
            code: Some("CAM-01".into()),
            description: Some("Mirrorless body".into()),
            image_reference: Some("data:image/jpeg;base64,/9j/4AAQ".into()),
        };
        let created = service.create_item(req.clone()).await.unwrap();
        let fetched = service.get_item(&created.code).await.unwrap();

        assert_eq!(Some(fetched.name), req.name);
        assert_eq!(Some(fetched.quantity), req.quantity);
        assert_eq!(Some(fetched.code), req.code);
        assert_eq!(fetched.description, req.description);
        assert_eq!(fetched.image_reference, req.image_reference);
    }

    #[tokio::test]
    async fn test_insert_race_is_retried_with_fresh_code() {
        let repo = Arc::new(RacingRepository::new(2));
        let service = ItemsService::new(
            repo.clone(),
            Arc::new(ScriptedGenerator::new(&["gen-1", "gen-2"])),
            10,
        );

        let created = service
            .create_item(request("Widget", 1, Some("A1")))
            .await
            .unwrap();
        // A1 lost the first race, gen-1 the second.
        assert_eq!(created.code, "gen-2");
        assert_eq!(repo.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_persistent_insert_conflicts_exhaust() {
        let service = ItemsService::new(
            Arc::new(RacingRepository::new(u32::MAX)),
            Arc::new(UuidCodeGenerator),
            3,
        );

        let err = service
            .create_item(request("Widget", 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResolutionExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_quantity_update_leaves_other_fields() {
        let service = service();
        let req = CreateItemRequest {
            name: Some("Lamp".into()),
            quantity: Some(4),
            code: Some("L-1".into()),
            description: Some("Desk lamp".into()),
            image_reference: Some("https://img.example/lamp.png".into()),
        };
        let created = service.create_item(req).await.unwrap();

        let updated = service.update_quantity("L-1", 11).await.unwrap();
        assert_eq!(updated.quantity, 11);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.image_reference, created.image_reference);
        assert_eq!(updated.code, created.code);
    }

    #[tokio::test]
    async fn test_full_update_and_null_clears() {
        let service = service();
        service
            .create_item(CreateItemRequest {
                name: Some("Lamp".into()),
                quantity: Some(4),
                code: Some("L-1".into()),
                description: Some("Desk lamp".into()),
                image_reference: Some("https://img.example/lamp.png".into()),
            })
            .await
            .unwrap();

        let patch = ItemPatch {
            name: Some("Floor lamp".into()),
            quantity: Some(1),
            description: Some(None),
            image_reference: Some(Some("https://img.example/floor.png".into())),
        };
        let updated = service.update_item("L-1", patch).await.unwrap();
        assert_eq!(updated.name, "Floor lamp");
        assert_eq!(updated.quantity, 1);
        assert_eq!(updated.description, None);
        assert_eq!(
            updated.image_reference.as_deref(),
            Some("https://img.example/floor.png")
        );
    }

    #[tokio::test]
    async fn test_missing_code_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get_item("nope").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.update_quantity("nope", 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        service
            .create_item(request("Widget", 1, Some("A1")))
            .await
            .unwrap();
        service.delete_item("A1").await.unwrap();
        service.delete_item("A1").await.unwrap();
        assert!(matches!(
            service.get_item("A1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_create_is_rejected_before_store() {
        let repo = Arc::new(MemoryItemRepository::new());
        let service = ItemsService::new(repo.clone(), Arc::new(UuidCodeGenerator), 10);
        let err = service
            .create_item(request("Widget", -1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repo.is_empty().await);
    }
}
