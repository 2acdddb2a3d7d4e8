use sqlx::postgres::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::models::{AuthUserRecord, UserMetadata};
use crate::error::AppError;

/// Repository over the identity provider's user table.
///
/// Reads back a user's email and metadata bag; the only write is the
/// best-effort metadata mirror issued after a profile update.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by ID.
    ///
    /// A user with no metadata fields set resolves to an empty bag, not an
    /// error; only a missing account yields `None`.
    pub async fn find(&self, user_id: Uuid) -> Result<Option<AuthUserRecord>, AppError> {
        sqlx::query_as::<_, AuthUserRecord>(
            r#"
            SELECT id, email, metadata
              FROM auth_user
             WHERE id = $1
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Replace a user's metadata bag (the profile mirror write).
    pub async fn update_metadata(
        &self,
        user_id: Uuid,
        metadata: &UserMetadata,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE auth_user
               SET metadata = $2
             WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Json(metadata))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
