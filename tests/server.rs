mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use demand_forecast::server::{router, AppState};
use demand_forecast::DemandApps;

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn app(fixture: &common::Fixture) -> axum::Router {
    router(AppState::new(DemandApps::new(fixture.config.clone()).unwrap()))
}

#[tokio::test]
async fn test_health() {
    let fixture = common::fixture(10);
    let (status, body) = call(app(&fixture), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_forecast_endpoint() {
    let fixture = common::fixture(60);
    let (status, body) = call(app(&fixture), get("/api/forecast?n_days=14")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["value"]["forecast"].as_array().unwrap().len(), 14);
    assert_eq!(json["value"]["context_len"], 46);
}

#[tokio::test]
async fn test_insufficient_history_is_inline_failure() {
    let fixture = common::fixture(40);
    let (status, body) = call(app(&fixture), get("/api/forecast?n_days=45")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["kind"], "insufficient_history");
    assert_eq!(json["recoverable"], true);
}

#[tokio::test]
async fn test_regional_endpoint() {
    let fixture = common::fixture(60);
    let (status, body) = call(
        app(&fixture),
        get("/api/forecast/regional?region=South&n_days=14&discount=25"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["value"]["region"], "South");
    assert_eq!(json["value"]["upper"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn test_chart_endpoint() {
    let fixture = common::fixture(60);
    let (status, body) = call(app(&fixture), get("/api/forecast/chart.svg?n_days=30")).await;
    assert_eq!(status, StatusCode::OK);
    let svg = String::from_utf8(body).unwrap();
    assert!(svg.starts_with("<svg"));
}

#[tokio::test]
async fn test_predict_endpoints() {
    let fixture = common::fixture(10);
    let scenario = json!({
        "Region": "North",
        "Category": "Electronics",
        "Holiday/Promotion": false,
        "Discount": 10
    });

    let (status, body) = call(app(&fixture), post_json("/api/predict/linear", scenario.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["value"]["message"], "Predicted Units Sold: 103.00");

    let (status, body) = call(app(&fixture), post_json("/api/predict/xgboost", scenario)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["value"]["units_sold"], 127.5);
}

#[tokio::test]
async fn test_missing_model_returns_unavailable() {
    let fixture = common::fixture(10);
    std::fs::remove_file(&fixture.config.artifacts.xgboost_path).unwrap();

    let (status, body) = call(app(&fixture), post_json("/api/predict/xgboost", json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["kind"], "artifact_load");
}

#[tokio::test]
async fn test_controls_endpoint() {
    let fixture = common::fixture(10);
    let (status, body) = call(app(&fixture), get("/api/controls")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["sliders"]["n_days"]["max"], 60.0);
    assert_eq!(json["selects"]["Weather Condition"]["default"], "Sunny");
}

fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn assert_invalid_input(request: Request<Body>) {
    let fixture = common::fixture(60);
    let (status, body) = call(app(&fixture), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["kind"], "invalid_input");
    assert_eq!(json["recoverable"], true);
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_numeric_horizon_is_tagged_failure() {
    assert_invalid_input(get("/api/forecast?n_days=abc")).await;
    assert_invalid_input(get("/api/forecast/chart.svg?n_days=-3")).await;
}

#[tokio::test]
async fn test_missing_region_is_tagged_failure() {
    assert_invalid_input(get("/api/forecast/regional?n_days=14")).await;
    assert_invalid_input(get("/api/forecast/regional?region=North&discount=lots")).await;
}

#[tokio::test]
async fn test_malformed_scenario_body_is_tagged_failure() {
    assert_invalid_input(post_raw("/api/predict/linear", "{not json")).await;
    assert_invalid_input(post_raw("/api/predict/xgboost", "[1,2]")).await;

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/predict/linear")
        .body(Body::from("{}"))
        .unwrap();
    assert_invalid_input(no_content_type).await;
}
