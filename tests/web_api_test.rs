mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{MockSubaruClient, MockVehicle, VIN_G2};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tribeca::Config;
use tribeca::session::BridgeSession;
use tribeca::starlink::SubaruClient;
use tribeca::web::router;

fn test_config() -> Config {
    let mut config = Config::default();
    config.account.username = "user@example.com".to_string();
    config.account.password = "hunter2".to_string();
    config.account.device_id = "1612345678901".to_string();
    config.account.pin = "1234".to_string();
    config
}

async fn session_with(vehicles: Vec<MockVehicle>) -> Arc<BridgeSession> {
    let mock = Arc::new(MockSubaruClient::new(vehicles));
    let client: Arc<dyn SubaruClient> = mock;
    let session = BridgeSession::start(&test_config(), client).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    Arc::new(session)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn vehicle_list_reports_capabilities_and_services() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .oneshot(Request::get("/api/vehicles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let vehicles = body["vehicles"].as_array().unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["vin"], VIN_G2);
    assert_eq!(vehicles[0]["available"], true);
    let services: Vec<&str> = vehicles[0]["services"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(services.contains(&"lock"));
    assert!(services.contains(&"fetch"));
}

#[tokio::test]
async fn vehicle_detail_projects_entities() {
    let session = session_with(vec![MockVehicle::ev(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .oneshot(
            Request::get(format!("/api/vehicles/{}", VIN_G2))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // Gen-2 PHEV: door/ignition binary sensors plus the EV pair
    assert_eq!(body["binary_sensors"].as_array().unwrap().len(), 9);
    // Odometer + gen-2 set + EV set
    assert_eq!(body["sensors"].as_array().unwrap().len(), 8);
    assert!(body["lock"].is_object());
}

#[tokio::test]
async fn unknown_vehicle_detail_is_404() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .oneshot(
            Request::get("/api/vehicles/JF2XXXXX0X0009999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_or_unregistered_services_are_404() {
    let mut safety_only = MockVehicle::g2(VIN_G2);
    safety_only.has_remote_service = false;
    safety_only.has_remote_start = false;
    let session = session_with(vec![safety_only]).await;
    let app = router(session);

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/vehicles/{}/services/self_destruct", VIN_G2))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Known service name, but no vehicle registered it
    let response = app
        .oneshot(
            Request::post(format!("/api/vehicles/{}/services/lock", VIN_G2))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_call_executes_and_reports_outcome() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .oneshot(
            Request::post(format!("/api/vehicles/{}/services/horn", VIN_G2))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn options_roundtrip_and_validation() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session);

    let response = app
        .clone()
        .oneshot(
            Request::put("/api/options")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"scan_interval_secs": 10, "hard_poll_interval_secs": 7200}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::put("/api/options")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"scan_interval_secs": 120, "hard_poll_interval_secs": 900}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/api/options").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["scan_interval_secs"], 120);
    assert_eq!(body["hard_poll_interval_secs"], 900);
}

#[tokio::test]
async fn notifications_list_shows_command_feedback() {
    let session = session_with(vec![MockVehicle::g2(VIN_G2)]).await;
    let app = router(session.clone());

    // An invalid VIN produces an error card
    let _ = app
        .clone()
        .oneshot(
            Request::post("/api/vehicles/JF2XXXXX0X0009999/services/horn")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/api/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    let notifications = body["notifications"].as_array().unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n["message"].as_str().unwrap_or("").contains("Invalid VIN"))
    );
}
