//! Server wiring: shared state, middleware stack, and app assembly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::Request;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};

use crate::config::Config;
use crate::db::{Database, create_pool};
use crate::jwt::JwtValidator;
use crate::middleware::{AuthLayer, RequestId, RequestIdLayer};
use crate::routes::routes;
use crate::storage::{S3Config, S3Storage};

/// Request timeout duration.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application state shared across handlers.
///
/// A single process-lifetime instance assembled at startup; components
/// receive it by injection rather than reaching for globals.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub storage: Option<Arc<S3Storage>>,
    pub signed_url_ttl_secs: u64,
    pub max_upload_bytes: usize,
}

/// Build and configure the complete application.
pub async fn build_app(config: &Config) -> anyhow::Result<(Router, SocketAddr)> {
    // Shared token validator, created once
    let jwt_validator = JwtValidator::new(&config.jwt_secret_key);

    // Database
    let pool = create_pool(config).await?;
    info!("Connected to database");
    sqlx::migrate!().run(&pool).await?;
    let database = Database::new(pool);

    // Object storage
    let storage = init_storage(config).await?;

    let addr: SocketAddr = config.http_address.parse()?;

    let app_state = AppState {
        db: database,
        storage,
        signed_url_ttl_secs: config.signed_url_ttl_secs,
        max_upload_bytes: config.max_upload_bytes,
    };

    let cors = build_cors(config.cors_allow_origins.as_deref());

    // Middleware stack (executes top-to-bottom on request)
    let middleware = ServiceBuilder::new()
        .layer(RequestIdLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    // RequestIdLayer runs first, so the extension is already
                    // set when the span is created.
                    let request_id = req
                        .extensions()
                        .get::<RequestId>()
                        .map_or("unknown", RequestId::as_str);
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(cors)
        .layer(AuthLayer::new(jwt_validator));

    let app = routes(app_state).layer(middleware);

    Ok((app, addr))
}

async fn init_storage(config: &Config) -> anyhow::Result<Option<Arc<S3Storage>>> {
    match (
        &config.s3_url,
        &config.s3_access_key_id,
        &config.s3_secret_access_key,
    ) {
        (Some(url), Some(key), Some(secret)) => {
            let s3_config = S3Config::from_url(url, key.clone(), secret.clone())?;
            let storage = S3Storage::new(s3_config).await?;
            Ok(Some(Arc::new(storage)))
        }
        _ => {
            info!("Object storage not configured; image uploads disabled");
            Ok(None)
        }
    }
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = match origins {
        Some(o) if o.trim() == "*" => CorsLayer::permissive(),
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::permissive(),
    };

    cors.allow_headers(Any)
        .expose_headers([http::HeaderName::from_static("x-request-id")])
        .allow_methods(Any)
        .max_age(Duration::from_secs(3600))
}
