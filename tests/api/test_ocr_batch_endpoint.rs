// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /ocr/batch tests

use super::support::{banner_detections, fixed_engine, post_json, state_with, ImageServer};
use axum::http::StatusCode;
use ocr_gateway::vision::EngineHandle;
use serde_json::json;

#[tokio::test]
async fn test_mixed_batch_keeps_order() {
    let server = ImageServer::start().await;
    let state = state_with(fixed_engine(banner_detections())).with_batch_concurrency(2);

    let urls = vec![
        server.url("/banner.png"),
        "http://127.0.0.1:9/unreachable.png".to_string(),
        server.url("/photo.jpg"),
        "not a url".to_string(),
        server.url("/moved"),
    ];

    let (status, body) = post_json(state, "/ocr/batch", json!(urls)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["processed"], 5);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    for (item, url) in results.iter().zip(&urls) {
        assert_eq!(item["url"], url.as_str());
    }

    let successes: Vec<bool> = results
        .iter()
        .map(|item| item["success"].as_bool().unwrap())
        .collect();
    assert_eq!(successes, vec![true, false, true, false, true]);

    assert_eq!(results[0]["data"]["text"], "SUMMER SALE\n50% OFF");
    assert_eq!(results[2]["data"]["metadata"]["format"], "JPEG");
    assert!(results[1]["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to download image"));
    assert!(results[3]["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid image URL"));
    assert!(results[1].get("data").is_none());
    assert!(results[0].get("error").is_none());
}

#[tokio::test]
async fn test_empty_batch() {
    let (status, body) = post_json(state_with(fixed_engine(vec![])), "/ocr/batch", json!([])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 0, "processed": 0, "results": [] }));
}

#[tokio::test]
async fn test_batch_without_engine_reports_each_item() {
    let server = ImageServer::start().await;
    let urls = vec![server.url("/banner.png"), server.url("/photo.jpg")];

    let (status, body) = post_json(state_with(EngineHandle::new()), "/ocr/batch", json!(urls)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], 2);
    for item in body["results"].as_array().unwrap() {
        assert_eq!(item["success"], false);
        assert_eq!(item["error"], "OCR engine not initialized");
    }
}

#[tokio::test]
async fn test_large_batch_sequential_concurrency() {
    let server = ImageServer::start().await;
    let state = state_with(fixed_engine(banner_detections())).with_batch_concurrency(1);
    let urls: Vec<String> = (0..12).map(|_| server.url("/banner.png")).collect();

    let (_, body) = post_json(state, "/ocr/batch", json!(urls)).await;

    assert_eq!(body["total"], 12);
    assert!(body["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["success"] == true));
}

#[tokio::test]
async fn test_batch_with_non_string_entry_is_422_with_detail() {
    for body in [json!(["https://example.com/a.png", 7]), json!({ "urls": [] })] {
        let (status, response) =
            post_json(state_with(fixed_engine(vec![])), "/ocr/batch", body.clone()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert!(response["detail"].is_string(), "body: {}", body);
        assert!(response.get("results").is_none());
    }
}
