//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use axum::http::{HeaderMap, HeaderValue};
use betus_core::UploadId;

/// Read a header as a string, if present and valid.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse an unsigned numeric header. Absent and unparsable both yield `None`.
pub(crate) fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name)?.trim().parse().ok()
}

/// Render a number as a header value.
pub(crate) fn num_header(n: u64) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or(HeaderValue::from_static("0"))
}

/// Parse the upload id segment of a `/files/{upload_id}` target.
/// A malformed id names no known upload.
pub(crate) fn parse_upload_id(raw: &str) -> ApiResult<UploadId> {
    UploadId::parse(raw).map_err(|_| ApiError::NotFound(format!("no such upload: {raw}")))
}

/// Fallback for `/files` targets that name no route.
pub async fn unknown_target() -> ApiError {
    ApiError::NotFound("unknown target".to_string())
}

/// Fallback for methods without tus semantics on a `/files` target.
pub async fn method_not_supported() -> ApiError {
    ApiError::BadRequest("method not supported".to_string())
}
