//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use betus_core::config::AppConfig;
use betus_files::FilesManager;
use betus_server::{AppState, create_router};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server over a temporary upload directory.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::for_testing();
        config.storage.path = temp_dir.path().join("files");
        modifier(&mut config);

        let files = Arc::new(
            FilesManager::new(&config.storage.path)
                .await
                .expect("Failed to create files manager"),
        );

        let state = AppState::new(config, files);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying files manager.
    pub fn files(&self) -> Arc<FilesManager> {
        self.state.files.clone()
    }

    /// The directory holding the upload file pairs.
    pub fn storage_dir(&self) -> PathBuf {
        self.state.config.storage.path.clone()
    }
}

/// Dispatch a request through the router.
#[allow(dead_code)]
pub async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

/// Request builder with the protocol version header pre-set.
#[allow(dead_code)]
pub fn tus_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Tus-Resumable", "1.0.0")
}

/// Build a PATCH append request for an upload.
#[allow(dead_code)]
pub fn patch_request(uuid: &str, offset: u64, body: &[u8]) -> Request<Body> {
    patch_builder(uuid, offset, body)
        .body(Body::from(body.to_vec()))
        .unwrap()
}

/// Build a PATCH append request carrying an `Upload-Checksum` header.
#[allow(dead_code)]
pub fn patch_request_with_checksum(
    uuid: &str,
    offset: u64,
    body: &[u8],
    checksum: &str,
) -> Request<Body> {
    patch_builder(uuid, offset, body)
        .header("Upload-Checksum", checksum)
        .body(Body::from(body.to_vec()))
        .unwrap()
}

fn patch_builder(uuid: &str, offset: u64, body: &[u8]) -> axum::http::request::Builder {
    tus_request("PATCH", &format!("/files/{uuid}"))
        .header("Content-Type", "application/offset+octet-stream")
        .header("Content-Length", body.len().to_string())
        .header("Upload-Offset", offset.to_string())
}

/// POST a new upload of the given length and return its id from `Location`.
#[allow(dead_code)]
pub async fn create_upload(server: &TestServer, length: u64) -> String {
    let request = tus_request("POST", "/files")
        .header("Upload-Length", length.to_string())
        .body(Body::empty())
        .unwrap();
    let response = send(&server.router, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    location_uuid(&response)
}

/// Extract the upload id from a 201 response's `Location` header.
#[allow(dead_code)]
pub fn location_uuid(response: &Response) -> String {
    let location = response
        .headers()
        .get("Location")
        .expect("missing Location header")
        .to_str()
        .unwrap();
    location.rsplit('/').next().unwrap().to_string()
}

/// Read a response header as a string.
#[allow(dead_code)]
pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
