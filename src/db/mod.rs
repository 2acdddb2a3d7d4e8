//! Database access: connection pool, records, and per-concern repositories.

pub mod models;
pub mod repository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::error::AppError;

pub use repository::{
    Database, ItemRepository, ProfileRepository, SocialRepository, UserRepository,
};

/// Create the database connection pool from configuration.
pub async fn create_pool(config: &Config) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .min_connections(config.db_pool_min)
        .max_connections(config.db_pool_max)
        .acquire_timeout(config.db_connect_timeout())
        .connect(&config.database_url())
        .await
        .map_err(Into::into)
}
