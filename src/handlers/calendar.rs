//! Availability calendar API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::BookingError;
use crate::inventory::{CalendarDay, CalendarDayView, CalendarOverrideRequest, CalendarWindowQuery};
use crate::models::ApiResponse;
use crate::state::AppState;

/// Per-date availability for a unit over a half-open window
pub async fn unit_calendar(
    State(app_state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Query(query): Query<CalendarWindowQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarDayView>>>, BookingError> {
    let window = app_state
        .calendar_service
        .read_window(&unit_id, query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::ok(window)))
}

/// Query parameters for whole-property availability
#[derive(Debug, Deserialize)]
pub struct PropertyWindowQuery {
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
    pub max_capacity: i32,
}

/// Whole-property availability (villas), computed on read
pub async fn property_calendar(
    State(app_state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(query): Query<PropertyWindowQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarDayView>>>, BookingError> {
    if query.max_capacity <= 0 {
        return Err(BookingError::Validation(
            "max_capacity must be greater than 0".to_string(),
        ));
    }

    let window = app_state
        .calendar_service
        .property_availability(&property_id, query.max_capacity, query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::ok(window)))
}

/// Admin calendar edit: upsert a full row, last write wins
pub async fn set_override(
    State(app_state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<CalendarOverrideRequest>,
) -> Result<Json<ApiResponse<CalendarDay>>, BookingError> {
    let day = app_state
        .calendar_service
        .set_override(&unit_id, request)
        .await?;
    Ok(Json(ApiResponse::ok(day)))
}
