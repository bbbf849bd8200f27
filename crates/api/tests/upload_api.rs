//! Integration tests for `POST /api/upload/image`.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, build_test_app, PNG_BYTES, TEST_MAX_UPLOAD_BYTES};

#[tokio::test]
async fn png_upload_is_stored_and_served() {
    let app = build_test_app();
    let url = app.upload_png().await;

    let name = url.strip_prefix("/uploads/").unwrap();
    assert!(name.starts_with("slide-"));
    assert!(name.ends_with(".png"));
    assert_eq!(std::fs::read(app.upload_dir.join(name)).unwrap(), PNG_BYTES);

    let served = app.get(&url).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_image_content_type_is_rejected() {
    let app = build_test_app();
    let response = app
        .post_multipart("/api/upload/image", "image", "text/plain", b"hello")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Only image files are allowed");
    assert!(!app.upload_dir.exists());
}

#[tokio::test]
async fn disguised_file_is_rejected() {
    let app = build_test_app();
    let response = app
        .post_multipart("/api/upload/image", "image", "image/png", b"#!/bin/sh\necho hi\n")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.upload_dir.exists());
}

#[tokio::test]
async fn oversize_upload_is_rejected() {
    let app = build_test_app();
    let mut data = PNG_BYTES.to_vec();
    data.resize(TEST_MAX_UPLOAD_BYTES + 1, 0);

    let response = app
        .post_multipart("/api/upload/image", "image", "image/png", &data)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.upload_dir.exists());
}

#[tokio::test]
async fn missing_image_field_is_rejected() {
    let app = build_test_app();
    let response = app
        .post_multipart("/api/upload/image", "file", "image/png", PNG_BYTES)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("No image uploaded"));
}
