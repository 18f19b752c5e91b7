//! Axum-based HTTP surface
//!
//! The bridge's host-facing API: entity read-outs projected from the latest
//! snapshot, remote service invocation, live polling options, and the
//! notification list plus its SSE stream.

use crate::binary_sensor::binary_sensors_for;
use crate::commands::RemoteCommand;
use crate::config::PollingConfig;
use crate::error::TribecaError;
use crate::lock::lock_for;
use crate::sensor::sensors_for;
use crate::session::BridgeSession;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<BridgeSession>,
}

#[derive(Debug, Deserialize)]
pub struct OptionsBody {
    pub scan_interval_secs: u64,
    pub hard_poll_interval_secs: u64,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn list_vehicles(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.session.coordinator.latest();
    let vehicles: Vec<_> = state
        .session
        .vehicles
        .values()
        .map(|info| {
            json!({
                "vin": info.vin,
                "name": info.display_name,
                "api_gen": info.api_gen,
                "has_ev": info.has_ev,
                "has_remote_start": info.has_remote_start,
                "has_remote_service": info.has_remote_service,
                "has_safety_service": info.has_safety_service,
                "available": snapshot.contains_key(&info.vin),
                "services": info
                    .supported_commands()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    Json(json!({ "vehicles": vehicles }))
}

async fn vehicle_detail(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> impl IntoResponse {
    let vin = vin.to_uppercase();
    let Some(info) = state.session.vehicles.get(&vin) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown vehicle: {}", vin)})),
        )
            .into_response();
    };

    let snapshot = state.session.coordinator.latest();
    let data = snapshot.get(&vin).cloned().unwrap_or_default();

    let binary_sensors: Vec<_> = binary_sensors_for(info)
        .iter()
        .map(|s| s.state_json(&data))
        .collect();
    let sensors: Vec<_> = sensors_for(info).iter().map(|s| s.state_json(&data)).collect();
    let lock = lock_for(info).map(|l| l.state_json());

    Json(json!({
        "vin": info.vin,
        "name": info.display_name,
        "available": snapshot.contains_key(&vin),
        "binary_sensors": binary_sensors,
        "sensors": sensors,
        "lock": lock,
    }))
    .into_response()
}

async fn call_service(
    State(state): State<AppState>,
    Path((vin, service)): Path<(String, String)>,
) -> impl IntoResponse {
    let Ok(command) = RemoteCommand::from_str(&service) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown service: {}", service)})),
        )
            .into_response();
    };
    if !state.session.dispatcher.is_registered(command) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Service not registered: {}", service)})),
        )
            .into_response();
    }

    match state.session.dispatcher.execute(command, &vin).await {
        Ok(success) => Json(json!({"ok": success, "service": service})).into_response(),
        Err(e @ TribecaError::UnknownVehicle { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e) if e.is_invalid_pin() => (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.current_options())
}

async fn put_options(
    State(state): State<AppState>,
    Json(body): Json<OptionsBody>,
) -> impl IntoResponse {
    let polling = PollingConfig {
        scan_interval_secs: body.scan_interval_secs,
        hard_poll_interval_secs: body.hard_poll_interval_secs,
    };
    match state.session.update_options(polling) {
        Ok(()) => Json(json!({"ok": true})).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn list_notifications(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"notifications": state.session.notifier.active()}))
}

async fn notifications_stream(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.session.notifier.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|res| match res {
        Ok(event) => serde_json::to_string(&event)
            .ok()
            .map(|data| Ok::<Event, std::convert::Infallible>(
                Event::default().event("notification").data(data),
            )),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Build the API router for a session
pub fn router(session: Arc<BridgeSession>) -> Router {
    let state = AppState { session };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/{vin}", get(vehicle_detail))
        .route("/api/vehicles/{vin}/services/{service}", post(call_service))
        .route("/api/options", get(get_options).put(put_options))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/stream", get(notifications_stream))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until the process exits
pub async fn serve(session: Arc<BridgeSession>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(session);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .unwrap_or_else(|_| ([127, 0, 0, 1], port).into());
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
