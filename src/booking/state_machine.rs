//! Booking lifecycle transition table
//!
//! The table is a pure function over `BookingStatus` so transition rules can
//! be tested without touching persistence. The services layer consults it
//! before issuing the guarded status update.

use crate::booking::{Booking, BookingStatus, PaymentStatus};
use crate::error::BookingError;

use BookingStatus::*;

/// Legal next states for a given lifecycle state.
///
/// Terminal states return an empty slice. The same-state no-op is handled
/// by `check_transition`, not listed here.
pub fn allowed_next(status: BookingStatus) -> &'static [BookingStatus] {
    match status {
        PaymentPending => &[PaymentSuccess],
        PaymentSuccess => &[BookingRequestSentToOwner],
        BookingRequestSentToOwner => &[OwnerConfirmed, OwnerCancelled],
        OwnerConfirmed => &[TicketGenerated],
        OwnerCancelled => &[RefundRequired, RefundInitiated, CancelledNoRefund],
        RefundRequired => &[RefundInitiated, RefundFailed],
        TicketGenerated | RefundInitiated | RefundFailed | CancelledNoRefund => &[],
    }
}

/// Result of a transition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Requested state is legal and differs from the current one
    Advance,
    /// Requested state equals the current one; succeed without writing
    AlreadyInState,
}

/// Validate a requested transition against the table.
///
/// Same-state requests succeed idempotently; anything else outside the
/// allowed set fails with the current status and the allowed set so the
/// caller can resynchronize.
pub fn check_transition(
    current: BookingStatus,
    requested: BookingStatus,
) -> Result<TransitionOutcome, BookingError> {
    if requested == current {
        return Ok(TransitionOutcome::AlreadyInState);
    }
    let allowed = allowed_next(current);
    if allowed.contains(&requested) {
        Ok(TransitionOutcome::Advance)
    } else {
        Err(BookingError::InvalidTransition { current, allowed })
    }
}

/// Cancellation processing branch, decided purely from the booking row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationPlan {
    /// A refund id already exists; return it without reprocessing
    AlreadyProcessed(String),
    /// Already closed without a refund; nothing left to do
    AlreadyClosed,
    /// Payment went through; initiate a refund
    Refund,
    /// Nothing was captured; close without a refund
    NoRefund,
}

/// Decide how cancellation processing should proceed.
///
/// The `refund_id` idempotency guard is checked before the status
/// precondition: initiating a refund sets the id and moves the booking to
/// `RefundInitiated` in one write, so a retried cancellation arrives in
/// that state and must get the existing id back, not an error. Only a
/// booking with no prior outcome is required to be in `OwnerCancelled`.
pub fn plan_cancellation(booking: &Booking) -> Result<CancellationPlan, BookingError> {
    if let Some(refund_id) = &booking.refund_id {
        return Ok(CancellationPlan::AlreadyProcessed(refund_id.clone()));
    }
    if booking.booking_status == CancelledNoRefund {
        return Ok(CancellationPlan::AlreadyClosed);
    }
    if booking.booking_status != OwnerCancelled {
        return Err(BookingError::InvalidStatus {
            expected: OwnerCancelled,
            current: booking.booking_status,
        });
    }
    if booking.payment_status == PaymentStatus::Success {
        Ok(CancellationPlan::Refund)
    } else {
        Ok(CancellationPlan::NoRefund)
    }
}
