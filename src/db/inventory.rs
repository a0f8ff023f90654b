use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::repository::ItemRepository;
use crate::error::AppResult;
use crate::models::{InventoryItem, ItemPatch, NewItem};

/// `inventory` table access. Columns are aliased onto `InventoryItem` field names
/// (`qr_code` → `code`, `image_url` → `image_reference`).
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn list_all(&self) -> AppResult<Vec<InventoryItem>> {
        let items: Vec<InventoryItem> = sqlx::query_as(
            "SELECT id, name, quantity, qr_code AS code, description, image_url AS image_reference \
             FROM inventory ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn get_by_code(&self, code: &str) -> AppResult<Option<InventoryItem>> {
        let item: Option<InventoryItem> = sqlx::query_as(
            "SELECT id, name, quantity, qr_code AS code, description, image_url AS image_reference \
             FROM inventory WHERE qr_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn exists_by_code(&self, code: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory WHERE qr_code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert(&self, item: &NewItem, code: &str) -> AppResult<InventoryItem> {
        let item: InventoryItem = sqlx::query_as(
            "INSERT INTO inventory (name, quantity, qr_code, description, image_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, quantity, qr_code AS code, description, image_url AS image_reference",
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(code)
        .bind(item.description.as_deref())
        .bind(item.image_reference.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    async fn update_by_code(
        &self,
        code: &str,
        patch: &ItemPatch,
    ) -> AppResult<Option<InventoryItem>> {
        // Nullable columns carry a "was supplied" flag so that an explicit null
        // clears the value while an omitted field keeps it.
        let item: Option<InventoryItem> = sqlx::query_as(
            "UPDATE inventory SET \
             name = COALESCE($1, name), \
             quantity = COALESCE($2, quantity), \
             description = CASE WHEN $3 THEN $4 ELSE description END, \
             image_url = CASE WHEN $5 THEN $6 ELSE image_url END \
             WHERE qr_code = $7 \
             RETURNING id, name, quantity, qr_code AS code, description, image_url AS image_reference",
        )
        .bind(patch.name.as_deref())
        .bind(patch.quantity)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.image_reference.is_some())
        .bind(patch.image_reference.clone().flatten())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete_by_code(&self, code: &str) -> AppResult<u64> {
        let rows_affected = sqlx::query("DELETE FROM inventory WHERE qr_code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
