//! Booking-related API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::booking::{
    Booking, CancellationOutcome, CreateBookingRequest, ListBookingsQuery, TransitionRequest,
    WebhookOutcome,
};
use crate::error::{ApiError, BookingError};
use crate::gateway::GatewayNotification;
use crate::models::ApiResponse;
use crate::state::AppState;

/// Create a new booking; starts life in `payment_pending`
pub async fn create_booking(
    State(app_state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, BookingError> {
    if let Err(e) = request.validate() {
        return Err(BookingError::Validation(e.to_string()));
    }

    let booking = app_state.booking_service.create_booking(request).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Get a single booking by ID
pub async fn get_booking(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, ApiError> {
    match app_state.booking_service.get_booking(&id).await {
        Ok(Some(booking)) => Ok(Json(ApiResponse::ok(booking))),
        Ok(None) => Err(ApiError::NotFound(format!("Booking {} not found", id))),
        Err(e) => Err(ApiError::InternalError(e.to_string())),
    }
}

/// List bookings with filtering and pagination
pub async fn list_bookings(
    State(app_state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, BookingError> {
    let bookings = app_state.booking_service.list_bookings(query).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

/// Request a raw lifecycle transition (owner confirm/cancel etc.)
pub async fn transition_booking(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<Booking>>, BookingError> {
    let booking = app_state
        .booking_service
        .transition_booking(&id, request.status)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Generate the ticket for an owner-confirmed booking
pub async fn process_confirmed(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, BookingError> {
    let booking = app_state.booking_service.process_confirmed(&id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Process an owner-cancelled booking (refund or close)
pub async fn process_cancelled(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CancellationOutcome>>, BookingError> {
    let outcome = app_state.booking_service.process_cancelled(&id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// Payment gateway webhook.
///
/// Always acknowledged with 200 so the gateway does not retry-storm;
/// unverifiable payloads are logged inside the service and change
/// nothing.
pub async fn payment_webhook(
    State(app_state): State<AppState>,
    Json(notification): Json<GatewayNotification>,
) -> Result<Json<ApiResponse<serde_json::Value>>, BookingError> {
    let verdict = app_state.payment_gateway.verify(&notification);
    let outcome = app_state
        .booking_service
        .handle_payment_webhook(verdict)
        .await?;

    let body = match outcome {
        WebhookOutcome::RejectedUnverified => serde_json::json!({
            "acknowledged": true,
            "applied": false,
        }),
        WebhookOutcome::PaymentCaptured(booking)
        | WebhookOutcome::PaymentPending(booking)
        | WebhookOutcome::PaymentFailed(booking) => serde_json::json!({
            "acknowledged": true,
            "applied": true,
            "booking_status": booking.booking_status,
            "payment_status": booking.payment_status,
        }),
    };

    Ok(Json(ApiResponse::ok(body)))
}
