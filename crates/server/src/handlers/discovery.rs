//! Capability discovery endpoint.

use crate::handlers::common::num_header;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use betus_core::protocol;

/// OPTIONS /files and OPTIONS /files/{upload_id}
///
/// Advertises the protocol version, size cap, and supported extensions.
/// No `Tus-Resumable` request header is required here.
pub async fn options_info(State(state): State<AppState>) -> Response {
    let mut resp = StatusCode::NO_CONTENT.into_response();
    let headers = resp.headers_mut();
    headers.insert(
        HeaderName::from_static(protocol::TUS_VERSION),
        HeaderValue::from_static(protocol::SUPPORTED_VERSIONS),
    );
    headers.insert(
        HeaderName::from_static(protocol::TUS_MAX_SIZE),
        num_header(state.config.server.max_upload_size),
    );
    headers.insert(
        HeaderName::from_static(protocol::TUS_EXTENSION),
        HeaderValue::from_static(protocol::SUPPORTED_EXTENSIONS),
    );
    headers.insert(
        HeaderName::from_static(protocol::TUS_CHECKSUM_ALGORITHM),
        HeaderValue::from_static(protocol::SUPPORTED_CHECKSUMS),
    );
    resp
}
