//! Ledger entry route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::ledger::*;
use crate::state::AppState;

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ledger/entries", post(create_entry))
        .route("/api/ledger/entries", get(list_entries))
        .route("/api/ledger/entries/:id", get(get_entry))
        .route("/api/ledger/entries/:id", put(update_entry))
        .route(
            "/api/ledger/entries/:id",
            axum::routing::delete(delete_entry),
        )
}
