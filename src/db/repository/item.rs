use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::db::models::{ItemRecord, ItemWrite};
use crate::error::AppError;

const ITEM_COLUMNS: &str = r#"id, user_id, name, brand, size, "type", layer, materials, weight,
                              temp_min, temp_max, waterproof, windproof, seasons, image, status,
                              favorite, is_public"#;

/// Repository for clothing items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All items belonging to one user.
    pub async fn list_owned_by(&self, user_id: Uuid) -> Result<Vec<ItemRecord>, AppError> {
        sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM clothing_item
             WHERE user_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// All items marked public, in storage return order.
    pub async fn list_public(&self) -> Result<Vec<ItemRecord>, AppError> {
        sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM clothing_item
             WHERE is_public = TRUE
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Bulk fetch by identifiers (single round-trip, not one query per item).
    pub async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ItemRecord>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
              FROM clothing_item
             WHERE id = ANY($1)
            "#
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new item for `owner_id`; the store assigns the identifier.
    pub async fn insert(&self, owner_id: Uuid, item: &ItemWrite) -> Result<ItemRecord, AppError> {
        sqlx::query_as::<_, ItemRecord>(&format!(
            r#"
            INSERT INTO clothing_item
                (user_id, name, brand, size, "type", layer, materials, weight,
                 temp_min, temp_max, waterproof, windproof, seasons, image, status,
                 favorite, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.size)
        .bind(&item.kind)
        .bind(item.layer)
        .bind(&item.materials)
        .bind(item.weight)
        .bind(item.temp_min)
        .bind(item.temp_max)
        .bind(item.waterproof)
        .bind(item.windproof)
        .bind(&item.seasons)
        .bind(&item.image)
        .bind(&item.status)
        .bind(item.favorite)
        .bind(item.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Full-record replace: every caller-supplied field is written.
    ///
    /// The owner is immutable after creation and is not part of the update.
    pub async fn replace(&self, item_id: Uuid, item: &ItemWrite) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE clothing_item
               SET name = $2,
                   brand = $3,
                   size = $4,
                   "type" = $5,
                   layer = $6,
                   materials = $7,
                   weight = $8,
                   temp_min = $9,
                   temp_max = $10,
                   waterproof = $11,
                   windproof = $12,
                   seasons = $13,
                   image = $14,
                   status = $15,
                   favorite = $16,
                   is_public = $17
             WHERE id = $1
            "#,
        )
        .bind(item_id)
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.size)
        .bind(&item.kind)
        .bind(item.layer)
        .bind(&item.materials)
        .bind(item.weight)
        .bind(item.temp_min)
        .bind(item.temp_max)
        .bind(item.waterproof)
        .bind(item.windproof)
        .bind(&item.seasons)
        .bind(&item.image)
        .bind(&item.status)
        .bind(item.favorite)
        .bind(item.is_public)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Item", item_id));
        }

        Ok(())
    }

    /// Delete an item outright. No soft delete.
    pub async fn delete(&self, item_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM clothing_item WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
