use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::db::models::{CommentRecord, NewCommentParams};
use crate::error::AppError;

/// Repository for likes, wishlist entries, and comments.
#[derive(Debug, Clone)]
pub struct SocialRepository {
    pool: PgPool,
}

impl SocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Likes
    // ------------------------------------------------------------------

    /// Record a like. Liking an already-liked item is a no-op success:
    /// only the uniqueness conflict is absorbed, other failures propagate.
    pub async fn like(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO item_like (user_id, item_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, item_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a like. Unliking a never-liked item is a no-op success.
    pub async fn unlike(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM item_like WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count likes for an item without fetching the rows.
    pub async fn like_count(&self, item_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM item_like WHERE item_id = $1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Whether `user_id` has liked `item_id`.
    pub async fn is_liked(&self, user_id: Uuid, item_id: Uuid) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM item_like WHERE user_id = $1 AND item_id = $2)",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// The caller's full like set, fetched once per listing.
    pub async fn liked_item_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT item_id FROM item_like WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    // ------------------------------------------------------------------
    // Wishlist
    // ------------------------------------------------------------------

    /// Add to wishlist; duplicate adds are no-op successes, like `like`.
    pub async fn wishlist_add(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO wishlist_entry (user_id, item_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, item_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn wishlist_remove(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM wishlist_entry WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn wishlist_item_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT item_id FROM wishlist_entry WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Append a comment; the author display fields are a write-time snapshot.
    pub async fn add_comment(&self, params: NewCommentParams) -> Result<CommentRecord, AppError> {
        sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comment (user_id, item_id, text, user_name, user_avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, item_id, text, user_name, user_avatar, created_at
            "#,
        )
        .bind(params.user_id)
        .bind(params.item_id)
        .bind(&params.text)
        .bind(&params.user_name)
        .bind(&params.user_avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Comments for an item, newest first. Unbounded; acceptable at current
    /// volume, revisit with pagination if comment counts grow.
    pub async fn comments_for_item(&self, item_id: Uuid) -> Result<Vec<CommentRecord>, AppError> {
        sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT id, user_id, item_id, text, user_name, user_avatar, created_at
              FROM comment
             WHERE item_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}
