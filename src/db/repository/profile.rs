use sqlx::postgres::PgPool;

use uuid::Uuid;

use crate::db::models::{ProfileRecord, ProfileUpsertParams};
use crate::error::AppError;

/// Repository for the application-owned profile table.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's profile row. Absent until the user first edits it.
    pub async fn get(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, AppError> {
        sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT user_id, name, avatar_url, bio, location, updated_at
              FROM profile
             WHERE user_id = $1
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Create-or-replace the profile row; every field is overwritten.
    pub async fn upsert(&self, params: ProfileUpsertParams) -> Result<ProfileRecord, AppError> {
        sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO profile (user_id, name, avatar_url, bio, location, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                bio = excluded.bio,
                location = excluded.location,
                updated_at = NOW()
            RETURNING user_id, name, avatar_url, bio, location, updated_at
            "#,
        )
        .bind(params.user_id)
        .bind(&params.name)
        .bind(&params.avatar_url)
        .bind(&params.bio)
        .bind(&params.location)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }
}
