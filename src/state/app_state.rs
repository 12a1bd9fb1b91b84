//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::booking::BookingService;
use crate::gateway::PaymentGateway;
use crate::inventory::CalendarService;
use crate::ledger::LedgerService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingService>,
    pub ledger_service: Arc<LedgerService>,
    pub calendar_service: Arc<CalendarService>,
    pub payment_gateway: Arc<PaymentGateway>,
}

impl AppState {
    pub fn new(
        booking_service: Arc<BookingService>,
        ledger_service: Arc<LedgerService>,
        calendar_service: Arc<CalendarService>,
        payment_gateway: Arc<PaymentGateway>,
    ) -> Self {
        Self {
            booking_service,
            ledger_service,
            calendar_service,
            payment_gateway,
        }
    }
}

impl FromRef<AppState> for Arc<BookingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.booking_service.clone()
    }
}

impl FromRef<AppState> for Arc<LedgerService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.ledger_service.clone()
    }
}

impl FromRef<AppState> for Arc<CalendarService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.calendar_service.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentGateway> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.payment_gateway.clone()
    }
}
