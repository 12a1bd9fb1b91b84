//! Booking route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::booking::*;
use crate::state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/:id", get(get_booking))
        .route("/api/bookings/:id/transition", post(transition_booking))
        .route("/api/bookings/:id/ticket", post(process_confirmed))
        .route("/api/bookings/:id/cancellation", post(process_cancelled))
        .route("/api/payments/webhook", post(payment_webhook))
}
