//! Repository per concern, combined into one `Database` handle.
//!
//! Each repository owns a clone of the pool; the combined struct is the single
//! process-lifetime handle assembled at startup and passed into handlers
//! through application state.

mod item;
mod profile;
mod social;
mod user;

pub use item::ItemRepository;
pub use profile::ProfileRepository;
pub use social::SocialRepository;
pub use user::UserRepository;

use sqlx::postgres::PgPool;

/// Combined database context with all repositories.
#[derive(Debug, Clone)]
pub struct Database {
    pub users: UserRepository,
    pub profiles: ProfileRepository,
    pub items: ItemRepository,
    pub social: SocialRepository,
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            social: SocialRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health by executing a simple query.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
