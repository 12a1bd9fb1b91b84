//! Ledger entry API handlers (owner/admin walk-in records)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::BookingError;
use crate::ledger::{
    CreateLedgerEntryRequest, LedgerEntry, ListEntriesQuery, UpdateLedgerEntryRequest,
};
use crate::models::ApiResponse;
use crate::state::AppState;

/// Record a walk-in stay and reconcile the calendar
pub async fn create_entry(
    State(app_state): State<AppState>,
    Json(request): Json<CreateLedgerEntryRequest>,
) -> Result<Json<ApiResponse<LedgerEntry>>, BookingError> {
    if let Err(e) = request.validate() {
        return Err(BookingError::Validation(e.to_string()));
    }

    let entry = app_state.ledger_service.create_entry(request).await?;
    Ok(Json(ApiResponse::ok(entry)))
}

/// Get a single ledger entry by ID
pub async fn get_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LedgerEntry>>, BookingError> {
    let entry = app_state
        .ledger_service
        .get_entry(&id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Ledger entry {} not found", id)))?;
    Ok(Json(ApiResponse::ok(entry)))
}

/// List ledger entries with filtering and pagination
pub async fn list_entries(
    State(app_state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerEntry>>>, BookingError> {
    let entries = app_state.ledger_service.list_entries(query).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// Edit a walk-in stay; reverses the old range before applying the new
pub async fn update_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLedgerEntryRequest>,
) -> Result<Json<ApiResponse<LedgerEntry>>, BookingError> {
    if let Err(e) = request.validate() {
        return Err(BookingError::Validation(e.to_string()));
    }

    let entry = app_state.ledger_service.update_entry(&id, request).await?;
    Ok(Json(ApiResponse::ok(entry)))
}

/// Delete a walk-in stay and release its capacity
pub async fn delete_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LedgerEntry>>, BookingError> {
    let entry = app_state.ledger_service.delete_entry(&id).await?;
    Ok(Json(ApiResponse::ok(entry)))
}
