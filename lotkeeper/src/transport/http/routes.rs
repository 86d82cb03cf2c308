//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

use crate::error::{LotError, ServiceError};
use crate::health::Health;
use crate::lot::MAX_LOT_CAPACITY;
use crate::service::{HealthSnapshot, LotService};
use crate::version::VersionInfo;

use super::openapi::openapi_document;

type ApiResponse = (StatusCode, Json<serde_json::Value>);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: Health,
    pub version: VersionInfo,
    pub lots: usize,
    pub total_slots: u64,
    pub available_slots: u64,
}

impl HealthCheckResponse {
    pub fn from_snapshot(snapshot: HealthSnapshot) -> Self {
        Self {
            status: snapshot.status(),
            version: snapshot.version,
            lots: snapshot.lots,
            total_slots: snapshot.total_slots,
            available_slots: snapshot.available_slots,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLotRequest {
    pub id: String,
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkRequest {
    pub reg_no: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    pub slot_number: u32,
}

fn bad_request(msg: impl Into<String>) -> ApiResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": msg.into() })),
    )
}

/// Map a service error to its status code. The core never picks one.
fn error_response(err: ServiceError) -> ApiResponse {
    let status = match &err {
        ServiceError::LotNotFound(_) | ServiceError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::LotAlreadyExists(_) => StatusCode::CONFLICT,
        ServiceError::Lot(LotError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::InvalidLotId | ServiceError::Lot(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

/// Unwrap a JSON body or turn the rejection into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiResponse> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

fn require_size(size: u32, what: &str) -> Result<u32, ApiResponse> {
    if size == 0 {
        return Err(bad_request(format!("{what} size must be at least 1.")));
    }
    if size > MAX_LOT_CAPACITY {
        return Err(bad_request(format!(
            "{what} size must be at most {MAX_LOT_CAPACITY}."
        )));
    }
    Ok(size)
}

fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiResponse> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{field} is required.")));
    }
    Ok(value)
}

macro_rules! try_response {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return response,
        }
    };
}

async fn health_check(State(service): State<Arc<LotService>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::from_snapshot(service.health()))
}

async fn api_docs() -> Json<serde_json::Value> {
    Json(openapi_document())
}

async fn shutdown(State(service): State<Arc<LotService>>) -> impl IntoResponse {
    tracing::info!("Shutdown requested via HTTP");
    service.trigger_shutdown();
    (StatusCode::OK, Json(serde_json::json!({})))
}

async fn create_lot(
    State(service): State<Arc<LotService>>,
    payload: Result<Json<CreateLotRequest>, JsonRejection>,
) -> ApiResponse {
    let request = try_response!(body(payload));
    let id = try_response!(require_text(&request.id, "Parking lot ID"));
    let size = try_response!(require_size(request.size, "Parking lot"));

    match service.create_lot(id, size) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": format!("Parking lot {} created with {} slots", id.trim(), size)
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn list_lots(State(service): State<Arc<LotService>>) -> ApiResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "parkingLots": service.list_lots() })),
    )
}

async fn get_lot(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
) -> ApiResponse {
    match service.lot_snapshot(&lot_id) {
        Ok(view) => (StatusCode::OK, Json(serde_json::json!(view))),
        Err(e) => error_response(e),
    }
}

async fn delete_lot(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
) -> ApiResponse {
    match service.delete_lot(&lot_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Parking lot {lot_id} deleted successfully.")
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn expand_lot(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
    payload: Result<Json<ResizeRequest>, JsonRejection>,
) -> ApiResponse {
    let request = try_response!(body(payload));
    let size = try_response!(require_size(request.size, "Expansion"));

    match service.expand_lot(&lot_id, size) {
        Ok(total) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Expanded by {size} slots"),
                "totalSlots": total
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn shrink_lot(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
    payload: Result<Json<ResizeRequest>, JsonRejection>,
) -> ApiResponse {
    let request = try_response!(body(payload));
    let size = try_response!(require_size(request.size, "Reduction"));

    match service.shrink_lot(&lot_id, size) {
        Ok(total) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Parking lot shrunk by {size} slots"),
                "totalSlots": total
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn park(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
    payload: Result<Json<ParkRequest>, JsonRejection>,
) -> ApiResponse {
    let request = try_response!(body(payload));
    let reg_no = try_response!(require_text(&request.reg_no, "Car registration number"));
    let color = try_response!(require_text(&request.color, "Car color"));

    match service.park(&lot_id, reg_no, color) {
        Ok(slot) => (
            StatusCode::OK,
            Json(serde_json::json!({ "allocated_slot_number": slot })),
        ),
        Err(e) => error_response(e),
    }
}

async fn clear_slot(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> ApiResponse {
    let request = try_response!(body(payload));
    if request.slot_number == 0 {
        return bad_request("Slot number must be at least 1.");
    }

    match service.clear_slot(&lot_id, request.slot_number) {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "freed_slot_number": request.slot_number })),
        ),
        Err(e) => error_response(e),
    }
}

async fn lot_status(
    State(service): State<Arc<LotService>>,
    Path(lot_id): Path<String>,
) -> ApiResponse {
    match service.occupied_slots(&lot_id) {
        Ok(occupied) => {
            let slots: Vec<serde_json::Value> = occupied
                .into_iter()
                .map(|(slot, car)| {
                    serde_json::json!({
                        "slot": slot,
                        "car": { "regNo": car.key(), "color": car.tag() }
                    })
                })
                .collect();
            (StatusCode::OK, Json(serde_json::json!(slots)))
        }
        Err(e) => error_response(e),
    }
}

async fn slots_by_color(
    State(service): State<Arc<LotService>>,
    Path((lot_id, color)): Path<(String, String)>,
) -> ApiResponse {
    match service.slots_by_tag(&lot_id, &color) {
        Ok(slots) => (StatusCode::OK, Json(serde_json::json!({ "slots": slots }))),
        Err(e) => error_response(e),
    }
}

async fn vehicles_by_color(
    State(service): State<Arc<LotService>>,
    Path((lot_id, color)): Path<(String, String)>,
) -> ApiResponse {
    match service.keys_by_tag(&lot_id, &color) {
        Ok(registrations) => (
            StatusCode::OK,
            Json(serde_json::json!({ "registrations": registrations })),
        ),
        Err(e) => error_response(e),
    }
}

async fn slot_by_reg(
    State(service): State<Arc<LotService>>,
    Path((lot_id, reg_no)): Path<(String, String)>,
) -> ApiResponse {
    match service.slot_by_key(&lot_id, &reg_no) {
        Ok(slot) => (StatusCode::OK, Json(serde_json::json!({ "slot": slot }))),
        Err(e) => error_response(e),
    }
}

pub fn routes(service: Arc<LotService>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/api-docs", get(api_docs))
        .route("/shutdown", post(shutdown))
        .route("/parking-lots", post(create_lot).get(list_lots))
        .route("/parking-lots/lots", get(list_lots))
        .route("/parking-lots/{lot_id}", get(get_lot).delete(delete_lot))
        .route("/parking-lots/{lot_id}/expand", patch(expand_lot))
        .route("/parking-lots/{lot_id}/shrink", patch(shrink_lot))
        .route("/parking-lots/{lot_id}/park", post(park))
        .route("/parking-lots/{lot_id}/clear", post(clear_slot))
        .route("/parking-lots/{lot_id}/status", get(lot_status))
        .route(
            "/parking-lots/{lot_id}/slots-by-color/{color}",
            get(slots_by_color),
        )
        .route(
            "/parking-lots/{lot_id}/vehicles-by-color/{color}",
            get(vehicles_by_color),
        )
        .route("/parking-lots/{lot_id}/slot-by-reg/{reg_no}", get(slot_by_reg))
        .with_state(service)
}
