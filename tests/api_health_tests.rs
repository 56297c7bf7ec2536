//! 健康检查 API 集成测试

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_root_liveness_text() {
    let app = TestApp::new();

    let response = app
        .send(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Car Doctor is running...");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let (status, json) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = TestApp::new();

    let (status, json) = app.get("/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"][0]["name"], "store");
}

#[tokio::test]
async fn test_tracking_headers_present() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .uri("/services")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
