//! HTTP ingest and query endpoints
//!
//! The ingest endpoint is deliberately forgiving: a rejected submission is
//! a `200` with `{"success": false}`, never an error status. Readings
//! arrive as query parameters so the smallest microcontroller client can
//! submit with a bare GET.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain-text banner |
//! | `GET` | `/api/devices` | List all devices in creation order |
//! | `GET` | `/api/measurements` | List all measurements in creation order |
//! | `GET` | `/api/measurements/create` | Submit readings for a device |
//! | `GET` | `/ws` | Upgrade to the binary sync protocol |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{Error, IngestError};
use crate::relay::{MeasurementInput, Relay};
use crate::server::ws;

/// Build the complete router for the relay server
pub fn build_router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/devices", get(list_devices))
        .route("/api/measurements", get(list_measurements))
        .route("/api/measurements/create", get(create_measurements))
        .route("/ws", get(ws::ws_viewer))
        .with_state(relay)
}

/// Query parameters for `GET /api/measurements/create`
#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    /// Device name; the device is created on first sight
    pub name: Option<String>,
    /// Temperature reading
    pub temperature: Option<f32>,
    /// Humidity reading
    pub humidity: Option<f32>,
    /// Lightness reading
    pub lightness: Option<f32>,
}

async fn index() -> &'static str {
    "Telemetry Relay API"
}

async fn list_devices(State(relay): State<Arc<Relay>>) -> impl IntoResponse {
    let devices = relay.devices().await;
    Json(serde_json::json!({ "data": devices }))
}

async fn list_measurements(State(relay): State<Arc<Relay>>) -> impl IntoResponse {
    let measurements = relay.measurements().await;
    Json(serde_json::json!({ "data": measurements }))
}

async fn create_measurements(
    State(relay): State<Arc<Relay>>,
    Query(params): Query<CreateQuery>,
) -> impl IntoResponse {
    let input = MeasurementInput {
        device_name: params.name.unwrap_or_default(),
        temperature: params.temperature,
        humidity: params.humidity,
        lightness: params.lightness,
    };

    match relay.submit(&input).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))),
        Err(Error::Ingest(IngestError::InvalidInput)) => {
            (StatusCode::OK, Json(serde_json::json!({ "success": false })))
        }
        Err(e) => {
            tracing::error!(error = %e, "Ingest failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false })),
            )
        }
    }
}
