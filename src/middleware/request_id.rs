//! Request ID propagation.
//!
//! The inbound `x-request-id` header is reused when sane, otherwise a fresh
//! id is generated. The id rides on request extensions so the request span,
//! created further down the stack, can read it at creation time; it is also
//! echoed back on the response for client-side correlation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Inbound ids longer than this are treated as garbage and replaced.
const MAX_REQUEST_ID_LENGTH: usize = 64;

/// Correlation id for one request, shared cheaply between the span and the
/// response path.
#[derive(Debug, Clone)]
pub struct RequestId(Arc<str>);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Reuse the client-supplied id when present and sane, else generate one.
    fn from_headers<T>(req: &Request<T>) -> Self {
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LENGTH)
            .map_or_else(Self::generate, |s| Self(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tower layer for request ID propagation.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

/// Request ID middleware service.
#[derive(Clone)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let id = RequestId::from_headers(&req);
        req.extensions_mut().insert(id.clone());

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut response = inner.call(req).await?;
            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RequestId::generate().as_str(), RequestId::generate().as_str());
    }

    #[test]
    fn sane_inbound_id_is_reused() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(RequestId::from_headers(&req).as_str(), "abc-123");
    }

    #[test]
    fn empty_or_oversized_inbound_id_is_replaced() {
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "")
            .body(())
            .unwrap();
        assert!(!RequestId::from_headers(&req).as_str().is_empty());

        let long_id = "x".repeat(MAX_REQUEST_ID_LENGTH + 1);
        let req = Request::builder()
            .header(REQUEST_ID_HEADER, &long_id)
            .body(())
            .unwrap();
        assert_ne!(RequestId::from_headers(&req).as_str(), long_id);
    }

    #[tokio::test]
    async fn id_is_visible_to_inner_layers_and_echoed_on_response() {
        // Inner layers (the span factory among them) read the id from
        // request extensions; it must be set before they run.
        let service = RequestIdLayer::new().layer(tower::service_fn(
            |req: Request<()>| async move {
                let id = req
                    .extensions()
                    .get::<RequestId>()
                    .expect("request id extension")
                    .clone();
                Ok::<_, std::convert::Infallible>(Response::new(id.as_str().to_string()))
            },
        ));

        let req = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(())
            .unwrap();
        let response = service.oneshot(req).await.unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
        assert_eq!(response.into_body(), "abc-123");
    }
}
