//! Availability calendar route definitions

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::calendar::*;
use crate::state::AppState;

pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/api/units/:unit_id/calendar", get(unit_calendar))
        .route("/api/units/:unit_id/calendar", put(set_override))
        .route(
            "/api/properties/:property_id/availability",
            get(property_calendar),
        )
}
