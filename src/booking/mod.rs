//! Booking record store and lifecycle state machine

pub mod model;
pub mod service;
pub mod state_machine;

pub use model::{
    Booking, BookingStatus, CancellationOutcome, CreateBookingRequest, ListBookingsQuery,
    PaymentStatus, PropertyType, TransitionRequest,
};
pub use service::{BookingService, WebhookOutcome};
pub use state_machine::{allowed_next, check_transition, plan_cancellation, TransitionOutcome};
