// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /ocr/url tests against a local image server and stub engines

use super::support::{
    banner_detections, fetch_config, fixed_engine, post_json, post_raw, state_with,
    state_with_fetch, FailingEngine, ImageServer,
};
use axum::http::StatusCode;
use ocr_gateway::{fetch::FetchConfig, vision::EngineHandle};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_recognizes_banner() {
    let server = ImageServer::start().await;
    let state = state_with(fixed_engine(banner_detections()));

    let (status, body) = post_json(
        state,
        "/ocr/url",
        json!({ "image_url": server.url("/banner.png") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "SUMMER SALE\n50% OFF");
    assert_eq!(body["lines"], json!(["SUMMER SALE", "50% OFF"]));
    assert_eq!(body["total_lines"], 2);

    let avg = body["avg_confidence"].as_f64().unwrap();
    assert!((avg - 0.92).abs() < 1e-6);

    let first = &body["detailed_lines"][0];
    assert_eq!(first["text"], "SUMMER SALE");
    assert_eq!(first["bbox"], json!([[12, 8], [212, 8], [212, 40], [12, 40]]));
    assert_eq!(
        body["detailed_lines"][1]["bbox"],
        json!([[12, 53], [162, 53], [162, 77], [12, 77]])
    );

    let metadata = &body["metadata"];
    assert_eq!(metadata["image_size"], "320x120");
    assert_eq!(metadata["width"], 320);
    assert_eq!(metadata["height"], 120);
    assert_eq!(metadata["format"], "PNG");
    assert_eq!(metadata["engine"], "stub");
    assert!(metadata.get("warning").is_none());
}

#[tokio::test]
async fn test_jpeg_format_reported() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        json!({ "image_url": server.url("/photo.jpg") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["format"], "JPEG");
    assert_eq!(body["metadata"]["image_size"], "64x48");
}

#[tokio::test]
async fn test_no_text_is_success_with_warning() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        json!({ "image_url": server.url("/banner.png") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "");
    assert_eq!(body["lines"], json!([]));
    assert_eq!(body["detailed_lines"], json!([]));
    assert_eq!(body["avg_confidence"], 0.0);
    assert_eq!(body["total_lines"], 0);
    assert_eq!(body["metadata"]["warning"], "No text detected");
    assert_eq!(body["metadata"]["image_size"], "320x120");
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(fixed_engine(banner_detections())),
        "/ocr/url",
        json!({ "image_url": server.url("/moved") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["image_size"], "320x120");
}

#[tokio::test]
async fn test_same_url_twice_is_identical() {
    let server = ImageServer::start().await;
    let state = state_with(fixed_engine(banner_detections()));
    let request = json!({ "image_url": server.url("/banner.png") });

    let (_, first) = post_json(state.clone(), "/ocr/url", request.clone()).await;
    let (_, second) = post_json(state, "/ocr/url", request).await;

    assert_eq!(first["text"], second["text"]);
    assert_eq!(first["lines"], second["lines"]);
    assert_eq!(first["detailed_lines"], second["detailed_lines"]);
}

#[tokio::test]
async fn test_invalid_urls_are_422() {
    for url in ["", "not a url", "ftp://example.com/a.png", "/relative/path.png"] {
        let (status, body) = post_json(
            state_with(fixed_engine(vec![])),
            "/ocr/url",
            json!({ "image_url": url }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "url: {:?}", url);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Invalid image URL"));
    }
}

#[tokio::test]
async fn test_engine_not_initialized_is_503() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(EngineHandle::new()),
        "/ocr/url",
        json!({ "image_url": server.url("/banner.png") }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "OCR engine not initialized");
}

#[tokio::test]
async fn test_http_error_status_is_400() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        json!({ "image_url": server.url("/missing") }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to download image"));
    assert!(detail.contains("404"));
}

#[tokio::test]
async fn test_unreachable_host_is_400() {
    let (status, body) = post_json(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        json!({ "image_url": "http://127.0.0.1:9/banner.png" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to download image"));
}

#[tokio::test]
async fn test_oversized_body_is_400() {
    let server = ImageServer::start().await;
    let state = state_with_fetch(
        fixed_engine(vec![]),
        FetchConfig {
            max_image_bytes: 1024,
            ..fetch_config()
        },
    );

    let (status, body) = post_json(
        state,
        "/ocr/url",
        json!({ "image_url": server.url("/large") }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("exceeds maximum size"));
}

#[tokio::test]
async fn test_undecodable_body_is_500() {
    let server = ImageServer::start().await;
    let (status, body) = post_json(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        json!({ "image_url": server.url("/garbage") }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("OCR processing failed"));
}

#[tokio::test]
async fn test_engine_failure_is_500() {
    let server = ImageServer::start().await;
    let state = state_with(EngineHandle::with_engine(Arc::new(FailingEngine)));

    let (status, body) = post_json(
        state,
        "/ocr/url",
        json!({ "image_url": server.url("/banner.png") }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "OCR processing failed: model session unavailable"
    );
}

#[tokio::test]
async fn test_malformed_bodies_are_422_with_detail() {
    for body in [json!({}), json!({ "image_url": 5 }), json!(["https://example.com/a.png"])] {
        let (status, response) =
            post_json(state_with(fixed_engine(vec![])), "/ocr/url", body.clone()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert!(
            response["detail"]
                .as_str()
                .unwrap()
                .starts_with("Invalid image URL"),
            "body: {}",
            body
        );
    }
}

#[tokio::test]
async fn test_non_json_body_is_422_with_detail() {
    let (status, body) = post_raw(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        "application/json",
        "image_url=https://example.com/a.png",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = post_raw(
        state_with(fixed_engine(vec![])),
        "/ocr/url",
        "text/plain",
        r#"{"image_url": "https://example.com/a.png"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}
