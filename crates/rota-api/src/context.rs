//! Request context extraction.
//!
//! Every request carries a request ID for tracing and correlation. Callers
//! may supply one via `X-Request-Id`; otherwise the server generates a ULID.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use ulid::Ulid;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request context derived from headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing/correlation.
    pub request_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let request_id =
            request_id_from_headers(&parts.headers).unwrap_or_else(|| Ulid::new().to_string());

        let ctx = Self { request_id };
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?;
    value
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Request ID middleware.
///
/// Injects a [`RequestContext`] into request extensions and stamps the
/// request ID onto the response for correlation.
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let ctx = match RequestContext::from_request_parts(&mut parts, &()).await {
        Ok(ctx) => ctx,
        Err(never) => match never {},
    };

    let request_id = ctx.request_id.clone();
    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_caller_supplied_request_id_is_kept() {
        let mut parts = parts_with_headers(&[("X-Request-Id", "req-123")]);
        let ctx = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(ctx.request_id, "req-123");
    }

    #[tokio::test]
    async fn test_missing_request_id_generates_a_ulid() {
        let mut parts = parts_with_headers(&[]);
        let ctx = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(ctx.request_id.parse::<Ulid>().is_ok());
    }

    #[tokio::test]
    async fn test_blank_request_id_is_replaced() {
        let mut parts = parts_with_headers(&[("X-Request-Id", "  ")]);
        let ctx = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(!ctx.request_id.trim().is_empty());
        assert_ne!(ctx.request_id, "  ");
    }

    #[tokio::test]
    async fn test_extraction_is_cached_in_extensions() {
        let mut parts = parts_with_headers(&[]);
        let first = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        let second = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(first.request_id, second.request_id);
    }
}
