// HTTP routes for viewers: read-only copies of the world plus explicit export.

use crate::domain::find_body;
use crate::domain::systems::telemetry::{Telemetry, telemetry};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::snapshot::encode_snapshot;
use crate::interface_adapters::state::AppState;
use crate::use_cases::autosave::save_now;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/snapshot", get(snapshot_handler))
        .route("/clock", get(clock_handler))
        .route("/telemetry", get(telemetry_handler))
        .route("/save", post(save_handler))
        .with_state(state)
}

#[derive(Debug, serde::Serialize)]
struct ClockResponse {
    tick: u64,
    tick_rate: f64,
    index: usize,
    multiplier: u32,
    time_per_tick: f64,
    elapsed: f64,
}

#[derive(Debug, serde::Deserialize)]
pub struct TelemetryQuery {
    target: String,
    reference: String,
}

#[derive(Debug, serde::Serialize)]
struct TelemetryResponse {
    target: String,
    reference: String,
    distance: f64,
    altitude: f64,
    speed: f64,
    orbital_speed: f64,
    semimajor_axis: f64,
    eccentricity: f64,
    periapsis: f64,
    apoapsis: f64,
    angular_speed: f64,
    fuel: f64,
}

impl TelemetryResponse {
    fn new(target: String, reference: String, t: Telemetry) -> Self {
        Self {
            target,
            reference,
            distance: t.distance,
            altitude: t.altitude,
            speed: t.speed,
            orbital_speed: t.orbital_speed,
            semimajor_axis: t.semimajor_axis,
            eccentricity: t.eccentricity,
            periapsis: t.periapsis,
            apoapsis: t.apoapsis,
            angular_speed: t.angular_speed,
            fuel: t.fuel,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SaveRequest {
    path: String,
}

#[derive(Debug, serde::Serialize)]
struct SaveResponse {
    path: String,
    bodies: usize,
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let bodies = state.sim.lock().await.bodies().to_vec();

    match encode_snapshot(&bodies) {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            text,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("failed to encode snapshot: {e}"))),
        )
            .into_response(),
    }
}

async fn clock_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sim = state.sim.lock().await;
    Json(ClockResponse {
        tick: sim.tick(),
        tick_rate: sim.clock.tick_rate(),
        index: sim.clock.index(),
        multiplier: sim.clock.multiplier(),
        time_per_tick: sim.clock.time_per_tick(),
        elapsed: sim.elapsed(),
    })
}

async fn telemetry_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let readings = {
        let sim = state.sim.lock().await;
        let bodies = sim.bodies();
        find_body(bodies, &query.target)
            .zip(find_body(bodies, &query.reference))
            .map(|(t, r)| telemetry(&bodies[t], &bodies[r]))
    };

    match readings {
        Some(readings) => Json(TelemetryResponse::new(
            query.target,
            query.reference,
            readings,
        ))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("body not found")),
        )
            .into_response(),
    }
}

async fn save_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveRequest>,
) -> impl IntoResponse {
    let path = payload.path.trim().to_string();
    if path.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("path is required")),
        )
            .into_response();
    }

    match save_now(&state.sim, &state.store, &path).await {
        Ok(bodies) => {
            info!(%path, bodies, "snapshot exported");
            Json(SaveResponse { path, bodies }).into_response()
        }
        Err(e) => {
            warn!(%path, error = %e, "snapshot export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e)),
            )
                .into_response()
        }
    }
}
