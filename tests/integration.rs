use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fare_meter::api::rest::router;
use fare_meter::config::MeterConfig;
use fare_meter::engine::meter::run_meter_engine;
use fare_meter::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    let (state, channels) = AppState::new(64, 1024, 256);
    let shared = Arc::new(state);
    tokio::spawn(run_meter_engine(
        shared.clone(),
        channels,
        MeterConfig::default(),
    ));
    router(shared)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn push_fix(app: &axum::Router, latitude: f64, longitude: f64) {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/positions",
            json!({ "latitude": latitude, "longitude": longitude }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["meter"], "gps-searching");
    assert_eq!(body["trips"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    push_fix(&app, 19.7, -103.46).await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("position_samples_total"));
    assert!(body.contains("current_fare"));
}

#[tokio::test]
async fn tariff_lists_routes_and_bands() {
    let app = setup();
    let response = app.oneshot(get_request("/tariff")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["base_fare"], 50.0);
    assert_eq!(body["routes"].as_array().unwrap().len(), 5);
    assert_eq!(body["distance_bands"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn start_without_position_conflicts() {
    let app = setup();
    let response = app.oneshot(post_request("/trip/start")).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("position"));
}

#[tokio::test]
async fn out_of_range_position_rejected() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/positions",
            json!({ "latitude": 91.0, "longitude": 0.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_rejected() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/route",
            json!({ "route_id": "nowhere" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fixed_route_sets_fare() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/route",
            json!({ "route_id": "cristo-rey", "sub_route_id": "cristo-rey-mitad" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["trip"]["cost"], 70.0);
    assert_eq!(body["route"]["sub_route"]["id"], "cristo-rey-mitad");
}

#[tokio::test]
async fn selections_locked_during_trip() {
    let app = setup();
    push_fix(&app, 19.7, -103.46).await;

    let res = app.clone().oneshot(post_request("/trip/start")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/route",
            json!({ "route_id": "walmart" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/surcharges/passengers",
            json!({ "adults": 1, "children": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/surcharges/errand",
            json!({ "kind": "purchase" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/surcharges/pet",
            json!({ "with_cage": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.oneshot(get_request("/meter")).await.unwrap();
    let meter = body_json(res).await;
    assert_eq!(meter["trip"]["cost"], 50.0);
}

#[tokio::test]
async fn get_nonexistent_trip_returns_404() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/trips/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_trip_flow() {
    let app = setup();
    push_fix(&app, 19.7, -103.46).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/surcharges/pet",
            json!({ "with_cage": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(post_request("/trip/start")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let snapshot = body_json(res).await;
    assert_eq!(snapshot["status"], "running");
    assert_eq!(snapshot["trip"]["cost"], 70.0);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/trip/stops", json!({ "kind": "quick" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(post_request("/trip/pause")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let snapshot = body_json(res).await;
    assert_eq!(snapshot["status"], "paused");

    let res = app
        .clone()
        .oneshot(json_request("POST", "/trip/stops", json!({ "kind": "service" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(post_request("/trip/stop")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary = body_json(res).await;
    assert_eq!(summary["cost"], 140.0);
    assert_eq!(summary["display_cost"], 140);
    assert_eq!(summary["stops"]["count"], 2);
    let summary_id = summary["id"].as_str().unwrap().to_string();

    let res = app.clone().oneshot(get_request("/trips")).await.unwrap();
    let trips = body_json(res).await;
    assert_eq!(trips.as_array().unwrap().len(), 1);
    assert_eq!(trips[0]["id"], summary_id);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/trips/{summary_id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.oneshot(get_request("/meter")).await.unwrap();
    let meter = body_json(res).await;
    assert_eq!(meter["trip"]["is_running"], false);
    assert_eq!(meter["stops"]["count"], 0);
    assert_eq!(meter["last_summary"]["id"], summary_id);
}

#[tokio::test]
async fn stop_without_trip_conflicts() {
    let app = setup();
    let response = app.oneshot(post_request("/trip/stop")).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
