//! Route table and health check handlers.

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::services::{items, profile, social, upload};
use crate::startup::AppState;

/// Build version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    checks: HealthChecks,
}

#[derive(Serialize)]
struct HealthChecks {
    database: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<CheckResult>,
}

#[derive(Serialize)]
struct CheckResult {
    status: &'static str,
}

impl CheckResult {
    const fn of(healthy: bool) -> Self {
        Self {
            status: if healthy { "healthy" } else { "unhealthy" },
        }
    }
}

/// Extra room for multipart framing on top of the configured upload limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router with the given state.
pub fn routes(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes + MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(|| async { "closet-service" }))
        .route("/health", get(|| async { "OK" }))
        .route("/health/live", get(|| async { "OK" }))
        .route("/health/ready", get(readiness_handler))
        // Catalog
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/{id}",
            put(items::update_item).delete(items::delete_item),
        )
        .route("/public-items", get(social::list_public_items))
        // Profile
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Social
        .route(
            "/social/like/{id}",
            post(social::like_item).delete(social::unlike_item),
        )
        .route("/social/likes", get(social::list_liked_items))
        .route("/social/likes/{id}", get(social::get_like_summary))
        .route("/social/comments/{id}", get(social::get_comments))
        .route("/social/comment/{id}", post(social::add_comment))
        .route(
            "/social/wishlist/{id}",
            post(social::add_to_wishlist).delete(social::remove_from_wishlist),
        )
        .route("/social/wishlist", get(social::get_wishlist))
        // Upload
        .route(
            "/upload-image",
            post(upload::upload_image).layer(body_limit),
        )
        .with_state(state)
}

async fn readiness_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = CheckResult::of(state.db.health_check().await);

    let storage = match &state.storage {
        Some(s3) => Some(CheckResult::of(s3.health_check().await)),
        None => None,
    };

    let healthy = database.status == "healthy"
        && storage.as_ref().map_or(true, |s| s.status == "healthy");

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: VERSION,
        checks: HealthChecks { database, storage },
    })
}
