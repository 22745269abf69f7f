//! Request precondition middleware.
//!
//! Applies the checks every tus endpoint shares and stamps the protocol
//! headers onto every response, including errors and the 404 fallback.

use crate::error::ApiError;
use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, SERVER};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use betus_core::protocol;

/// Whether the request declares the protocol version this server speaks.
fn has_supported_version(headers: &HeaderMap) -> bool {
    headers
        .get(protocol::TUS_RESUMABLE)
        .and_then(|v| v.to_str().ok())
        == Some(protocol::SUPPORTED_VERSION)
}

/// tus precondition middleware.
///
/// HEAD, POST, PATCH and DELETE require `Tus-Resumable: 1.0.0` and get 412
/// otherwise. Every response leaves with `Tus-Resumable`, `Server`, and a
/// `Content-Length: 0` for the empty bodies this protocol produces.
pub async fn tus_preconditions(req: Request, next: Next) -> Response {
    let is_metrics = req.uri().path().starts_with("/metrics");
    let target_ok = req.uri().path().starts_with(protocol::FILES_PREFIX);
    let version_required = matches!(
        *req.method(),
        Method::HEAD | Method::POST | Method::PATCH | Method::DELETE
    );

    // The target check comes first: a request outside /files is 404 even
    // when its version header is missing.
    let mut resp = if !target_ok && !is_metrics {
        ApiError::NotFound("unknown target".to_string()).into_response()
    } else if version_required && !has_supported_version(req.headers()) {
        ApiError::PreconditionFailed(format!(
            "Tus-Resumable {} required",
            protocol::SUPPORTED_VERSION
        ))
        .into_response()
    } else {
        next.run(req).await
    };

    if !is_metrics {
        let headers = resp.headers_mut();
        headers.insert(
            HeaderName::from_static(protocol::TUS_RESUMABLE),
            HeaderValue::from_static(protocol::SUPPORTED_VERSION),
        );
        headers.insert(SERVER, HeaderValue::from_static(protocol::SERVER_NAME));
        headers
            .entry(CONTENT_LENGTH)
            .or_insert(HeaderValue::from_static("0"));
    }
    resp
}
