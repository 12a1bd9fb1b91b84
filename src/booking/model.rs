//! Booking models and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Rentable property categories
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Villa,
    Camping,
    Cottage,
}

/// Gateway-facing payment state of a booking
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Initiated,
    Pending,
    Success,
    Failed,
}

/// Booking lifecycle state
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PaymentPending,
    PaymentSuccess,
    BookingRequestSentToOwner,
    OwnerConfirmed,
    OwnerCancelled,
    TicketGenerated,
    RefundRequired,
    RefundInitiated,
    RefundFailed,
    CancelledNoRefund,
}

impl BookingStatus {
    /// Wire name, matching the serde/sqlx representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PaymentPending => "payment_pending",
            BookingStatus::PaymentSuccess => "payment_success",
            BookingStatus::BookingRequestSentToOwner => "booking_request_sent_to_owner",
            BookingStatus::OwnerConfirmed => "owner_confirmed",
            BookingStatus::OwnerCancelled => "owner_cancelled",
            BookingStatus::TicketGenerated => "ticket_generated",
            BookingStatus::RefundRequired => "refund_required",
            BookingStatus::RefundInitiated => "refund_initiated",
            BookingStatus::RefundFailed => "refund_failed",
            BookingStatus::CancelledNoRefund => "cancelled_no_refund",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking model
///
/// Owner/admin phone numbers are denormalized at creation time so that
/// notification dispatch never needs a join. Bookings are never hard
/// deleted; terminal states are retained for audit.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub property_name: String,
    pub property_type: PropertyType,
    pub guest_name: String,
    pub guest_phone: String,
    pub owner_phone: String,
    pub admin_phone: String,
    pub checkin_at: DateTime<Utc>,
    pub checkout_at: DateTime<Utc>,
    /// Villa occupancy
    pub persons: Option<i32>,
    pub max_capacity: Option<i32>,
    /// Camping/cottage occupancy
    pub veg_guest_count: Option<i32>,
    pub nonveg_guest_count: Option<i32>,
    /// Amounts in the smallest currency unit
    pub advance_amount: i64,
    pub total_amount: Option<i64>,
    pub payment_status: PaymentStatus,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub booking_status: BookingStatus,
    /// Set exactly once; guards against double refund processing
    pub refund_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Remaining balance, when a total was captured at creation
    pub fn due_amount(&self) -> Option<i64> {
        self.total_amount.map(|total| total - self.advance_amount)
    }
}

/// Request DTO for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    #[validate(length(min = 1))]
    pub property_name: String,
    pub property_type: PropertyType,
    #[validate(length(min = 1))]
    pub guest_name: String,
    #[validate(length(min = 7, max = 15))]
    pub guest_phone: String,
    #[validate(length(min = 7, max = 15))]
    pub owner_phone: String,
    #[validate(length(min = 7, max = 15))]
    pub admin_phone: String,
    pub checkin_at: DateTime<Utc>,
    pub checkout_at: DateTime<Utc>,
    pub persons: Option<i32>,
    pub max_capacity: Option<i32>,
    pub veg_guest_count: Option<i32>,
    pub nonveg_guest_count: Option<i32>,
    pub advance_amount: i64,
    pub total_amount: Option<i64>,
}

impl CreateBookingRequest {
    /// Cross-field validation on top of the derive-level field checks
    pub fn validate_booking(&self) -> Result<(), String> {
        if self.checkout_at <= self.checkin_at {
            return Err("Checkout must be strictly after checkin".to_string());
        }
        if self.advance_amount <= 0 {
            return Err("Advance amount must be greater than 0".to_string());
        }
        if let Some(total) = self.total_amount {
            if total < self.advance_amount {
                return Err("Total amount cannot be less than the advance".to_string());
            }
        }
        match self.property_type {
            PropertyType::Villa => {
                let persons = self.persons.ok_or("Villa bookings require persons")?;
                let max = self
                    .max_capacity
                    .ok_or("Villa bookings require max_capacity")?;
                if persons < 1 || persons > max {
                    return Err(format!(
                        "Persons must be between 1 and the villa capacity of {}",
                        max
                    ));
                }
            }
            PropertyType::Camping | PropertyType::Cottage => {
                let veg = self.veg_guest_count.unwrap_or(0);
                let nonveg = self.nonveg_guest_count.unwrap_or(0);
                if veg < 0 || nonveg < 0 || veg + nonveg <= 0 {
                    return Err("Guest count must be greater than 0".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Request DTO for a raw status transition
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: BookingStatus,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
    pub property_id: Option<Uuid>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Outcome of cancellation processing
#[derive(Debug, Serialize)]
pub struct CancellationOutcome {
    pub booking: Booking,
    /// Present when a refund was (or had already been) initiated
    pub refund_id: Option<String>,
}
