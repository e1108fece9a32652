//! Probe and metrics endpoints.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{app, read_json, test_config};
use herbal_service::services::providers::mock::MockTextProvider;
use herbal_service::startup::{build_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _) = app(vec![]);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "herbal-service");
    assert_eq!(body["model"], "mock");
}

#[tokio::test]
async fn readiness_check_returns_ok_when_provider_healthy() {
    let (app, _) = app(vec![]);

    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_check_fails_when_provider_unhealthy() {
    let app = build_router(AppState::new(
        test_config(),
        Arc::new(MockTextProvider::unhealthy()),
    ));

    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Service unavailable");
}

#[tokio::test]
async fn metrics_endpoint_responds_without_recorder() {
    let (app, _) = app(vec![]);

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
