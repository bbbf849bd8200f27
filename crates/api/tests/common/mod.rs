#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use async_trait::async_trait;
use axum::Router;
use http_body_util::BodyExt;
use pitchdeck_core::catalog::DefaultCatalog;
use pitchdeck_core::slide::SlideDocument;
use pitchdeck_core::types::Position;
use pitchdeck_db::models::slide::{SlideRow, UpsertSlide};
use pitchdeck_db::{ClearedImage, MemorySlideStore, SlideStore, StoreError};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pitchdeck_api::config::ServerConfig;
use pitchdeck_api::router::build_app_router;
use pitchdeck_api::state::AppState;
use pitchdeck_api::uploads::UploadStorage;

/// Upload limit used by the tests; small so oversize bodies stay cheap.
pub const TEST_MAX_UPLOAD_BYTES: usize = 4096;

/// Smallest byte string that sniffs as a PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// Build a test `ServerConfig` with safe defaults and an upload directory
/// under `root`.
pub fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        upload_dir: root.join("uploads"),
        static_dir: root.join("static"),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        deck_catalog_path: None,
        app_env: "test".to_string(),
    }
}

/// A store whose every call fails, as an unreachable database would.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl SlideStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn list(&self) -> Result<Vec<SlideRow>, StoreError> {
        Err(unavailable())
    }

    async fn upsert(&self, _position: Position, _dto: &UpsertSlide) -> Result<SlideRow, StoreError> {
        Err(unavailable())
    }

    async fn attach_image(
        &self,
        _position: Position,
        _seed: &SlideDocument,
        _image_url: &str,
    ) -> Result<SlideRow, StoreError> {
        Err(unavailable())
    }

    async fn clear_image(&self, _position: Position) -> Result<Option<ClearedImage>, StoreError> {
        Err(unavailable())
    }
}

/// A running router over a slide store (in-memory unless built with
/// [`build_test_app_over`]). The temp dir lives as long as this value.
pub struct TestApp<S: SlideStore = MemorySlideStore> {
    pub router: Router,
    pub store: Arc<S>,
    pub upload_dir: PathBuf,
    _root: TempDir,
}

impl<S: SlideStore> TestApp<S> {
    pub async fn get(&self, uri: &str) -> Response<Body> {
        send(&self.router, Method::GET, uri, Body::empty(), None).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response<Body> {
        send(&self.router, Method::PUT, uri, Body::from(body.to_string()), Some("application/json")).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        send(&self.router, Method::POST, uri, Body::from(body.to_string()), Some("application/json")).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        send(&self.router, Method::DELETE, uri, Body::empty(), None).await
    }

    /// POST a single-part multipart form.
    pub async fn post_multipart(
        &self,
        uri: &str,
        field: &str,
        content_type: &str,
        data: &[u8],
    ) -> Response<Body> {
        let boundary = "pitchdeck-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        send(
            &self.router,
            Method::POST,
            uri,
            Body::from(body),
            Some(&format!("multipart/form-data; boundary={boundary}")),
        )
        .await
    }

    /// Upload [`PNG_BYTES`] and return the public URL.
    pub async fn upload_png(&self) -> String {
        let response = self
            .post_multipart("/api/upload/image", "image", "image/png", PNG_BYTES)
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["imageUrl"]
            .as_str()
            .expect("imageUrl in upload response")
            .to_string()
    }
}

/// Build the full application router over the embedded catalog.
pub fn build_test_app() -> TestApp {
    build_test_app_with(DefaultCatalog::embedded().expect("embedded catalog"), |_| {})
}

/// Build the full application router over `catalog`, letting the caller
/// adjust the config first.
pub fn build_test_app_with(catalog: DefaultCatalog, configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    assemble(catalog, configure, Arc::new(MemorySlideStore::new()))
}

/// Build the full application router over the embedded catalog and `store`.
pub fn build_test_app_over<S: SlideStore + 'static>(store: S) -> TestApp<S> {
    let catalog = DefaultCatalog::embedded().expect("embedded catalog");
    assemble(catalog, |_| {}, Arc::new(store))
}

fn assemble<S: SlideStore + 'static>(
    catalog: DefaultCatalog,
    configure: impl FnOnce(&mut ServerConfig),
    store: Arc<S>,
) -> TestApp<S> {
    let root = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(root.path());
    configure(&mut config);

    let state = AppState {
        store: Arc::clone(&store) as Arc<dyn SlideStore>,
        catalog: Arc::new(catalog),
        uploads: Arc::new(UploadStorage::new(config.upload_dir.clone())),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        upload_dir: config.upload_dir.clone(),
        _root: root,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<&str>,
) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
