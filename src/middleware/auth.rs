//! Bearer authentication middleware.
//!
//! Resolves the `Authorization` header to an `AuthInfo` and injects it into
//! request extensions. Public routes pass through without a credential, but a
//! valid one is still attached so handlers can personalize their response
//! (e.g. `isLikedByMe` on the public listing).

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use http::{Request, Response, StatusCode};
use phf::phf_set;
use tower::{Layer, Service};
use tracing::{Span, debug};

use crate::jwt::{AuthInfo, JwtError, JwtValidator};

/// Routes that never require a credential.
/// Compile-time perfect hash set for O(1) lookup with zero runtime initialization.
static PUBLIC_ROUTES: phf::Set<&'static str> = phf_set! {
    "/",
    "/health",
    "/health/live",
    "/health/ready",
    "/public-items",
};

/// Route prefixes that never require a credential.
///
/// `GET /social/likes/{id}` and `GET /social/comments/{id}` are readable by
/// visitors; note the bare `/social/likes` (the caller's liked items) is not.
const PUBLIC_PREFIXES: &[&str] = &["/social/likes/", "/social/comments/"];

/// Tower layer for bearer authentication.
#[derive(Clone)]
pub struct AuthLayer {
    validator: JwtValidator,
}

impl AuthLayer {
    #[must_use]
    pub const fn new(validator: JwtValidator) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    validator: JwtValidator,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Allow CORS preflight
        if req.method() == http::Method::OPTIONS {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        let auth = self.authenticate(&req);

        if let Ok(auth_info) = &auth {
            Span::current().record("user_id", auth_info.user_id.to_string());
            debug!(user_id = %auth_info.user_id, "Authenticated");
            req.extensions_mut().insert(auth_info.clone());
        }

        if is_public_route(req.uri().path()) {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        match auth {
            Ok(_) => {
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
            Err(err) => Box::pin(async move { Ok(unauthorized_response(&err)) }),
        }
    }
}

impl<S> AuthMiddleware<S> {
    fn authenticate<T>(&self, req: &Request<T>) -> Result<AuthInfo, JwtError> {
        let header = req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(JwtError::MissingHeader)?;

        self.validator.resolve(header)
    }
}

/// Check if a path is reachable without a credential.
fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.contains(path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Build the 401 response for missing or invalid credentials.
fn unauthorized_response(err: &JwtError) -> Response<Body> {
    let body = serde_json::json!({ "detail": err.to_string() }).to_string();
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("content-type", "application/json")
        .header("www-authenticate", "Bearer")
        .body(Body::from(body))
        .expect("valid response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes_identified_correctly() {
        assert!(is_public_route("/"));
        assert!(is_public_route("/health"));
        assert!(is_public_route("/health/live"));
        assert!(is_public_route("/health/ready"));
        assert!(is_public_route("/public-items"));
        assert!(is_public_route("/social/likes/3fa85f64-0000-0000-0000-000000000000"));
        assert!(is_public_route("/social/comments/3fa85f64-0000-0000-0000-000000000000"));
    }

    #[test]
    fn protected_routes_require_credentials() {
        // The caller's own liked items need a caller.
        assert!(!is_public_route("/social/likes"));
        assert!(!is_public_route("/items"));
        assert!(!is_public_route("/profile"));
        assert!(!is_public_route("/social/like/abc"));
        assert!(!is_public_route("/social/comment/abc"));
        assert!(!is_public_route("/social/wishlist"));
        assert!(!is_public_route("/social/wishlist/abc"));
        assert!(!is_public_route("/upload-image"));
    }

    #[test]
    fn unauthorized_response_is_json_detail() {
        let response = unauthorized_response(&JwtError::InvalidToken);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn unauthorized_body_stays_valid_json_with_quoted_message() {
        let response = unauthorized_response(&JwtError::InvalidClaim(r#"su"b"#));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["detail"], r#"invalid claim: su"b"#);
    }
}
