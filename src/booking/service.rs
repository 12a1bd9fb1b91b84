//! Booking service layer - lifecycle operations over the record store
//!
//! Every status change goes through a conditional update guarded by the
//! current status, so concurrent mutations of the same booking cannot
//! produce an illegal transition: the loser of the race sees zero rows
//! updated and reports `InvalidTransition` against the fresh state.

use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::booking::state_machine::{
    check_transition, plan_cancellation, CancellationPlan, TransitionOutcome,
};
use crate::booking::{
    Booking, BookingStatus, CancellationOutcome, CreateBookingRequest, ListBookingsQuery,
    PaymentStatus,
};
use crate::error::BookingError;
use crate::gateway::{GatewayStatus, GatewayVerdict};
use crate::notifier::{MessageTemplate, NotificationIntent, Notifier};

/// Days quoted to guests in refund-initiated messages
const REFUND_SLA_DAYS: u32 = 7;

/// Outcome of a payment webhook
#[derive(Debug)]
pub enum WebhookOutcome {
    /// Signature did not verify; acknowledged but nothing changed
    RejectedUnverified,
    /// Payment captured; booking advanced and owner notified
    PaymentCaptured(Booking),
    /// Gateway still processing; payment status marked pending
    PaymentPending(Booking),
    /// Gateway reported failure; payment status marked failed
    PaymentFailed(Booking),
}

/// Booking service for managing the booking lifecycle
#[derive(Clone)]
pub struct BookingService {
    db_pool: PgPool,
    notifier: Notifier,
    ticket_base_url: String,
}

impl BookingService {
    /// Create a new booking service instance
    pub fn new(db_pool: PgPool, notifier: Notifier, ticket_base_url: String) -> Self {
        Self {
            db_pool,
            notifier,
            ticket_base_url,
        }
    }

    /// Create a booking in `payment_pending` with a fresh gateway order id
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        request
            .validate_booking()
            .map_err(BookingError::Validation)?;

        let id = Uuid::new_v4();
        let order_id = generate_order_id();

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, property_id, property_name, property_type,
                guest_name, guest_phone, owner_phone, admin_phone,
                checkin_at, checkout_at,
                persons, max_capacity, veg_guest_count, nonveg_guest_count,
                advance_amount, total_amount,
                payment_status, order_id, booking_status,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.property_id)
        .bind(&request.property_name)
        .bind(request.property_type)
        .bind(&request.guest_name)
        .bind(&request.guest_phone)
        .bind(&request.owner_phone)
        .bind(&request.admin_phone)
        .bind(request.checkin_at)
        .bind(request.checkout_at)
        .bind(request.persons)
        .bind(request.max_capacity)
        .bind(request.veg_guest_count)
        .bind(request.nonveg_guest_count)
        .bind(request.advance_amount)
        .bind(request.total_amount)
        .bind(PaymentStatus::Initiated)
        .bind(&order_id)
        .bind(BookingStatus::PaymentPending)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(booking_id = %booking.id, order_id = %order_id, "Booking created");

        Ok(booking)
    }

    /// Get a single booking by ID
    pub async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(booking)
    }

    /// List bookings with filtering and pagination
    pub async fn list_bookings(
        &self,
        query: ListBookingsQuery,
    ) -> Result<Vec<Booking>, BookingError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM bookings WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND booking_status = ");
            query_builder.push_bind(status);
        }
        if let Some(property_id) = query.property_id {
            query_builder.push(" AND property_id = ");
            query_builder.push_bind(property_id);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let bookings = query_builder
            .build_query_as::<Booking>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(bookings)
    }

    /// Apply a requested status transition through the guarded table.
    ///
    /// A same-state request is an idempotent no-op and returns the booking
    /// unchanged.
    pub async fn transition_booking(
        &self,
        id: &Uuid,
        requested: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_booking(id).await?;

        match check_transition(booking.booking_status, requested)? {
            TransitionOutcome::AlreadyInState => Ok(booking),
            TransitionOutcome::Advance => {
                self.persist_transition(id, booking.booking_status, requested)
                    .await
            }
        }
    }

    /// Confirm-to-ticket: `owner_confirmed` -> `ticket_generated`, then
    /// notify the guest (ticket link) and the admin (due-amount summary).
    pub async fn process_confirmed(&self, id: &Uuid) -> Result<Booking, BookingError> {
        let booking = self.fetch_booking(id).await?;

        if booking.booking_status != BookingStatus::OwnerConfirmed {
            return Err(BookingError::InvalidStatus {
                expected: BookingStatus::OwnerConfirmed,
                current: booking.booking_status,
            });
        }

        let booking = self
            .persist_transition(id, BookingStatus::OwnerConfirmed, BookingStatus::TicketGenerated)
            .await?;

        let intents = vec![
            NotificationIntent::new(
                booking.guest_phone.clone(),
                MessageTemplate::TicketReady {
                    guest_name: booking.guest_name.clone(),
                    ticket_url: format!("{}/{}", self.ticket_base_url, booking.id),
                },
            ),
            NotificationIntent::new(
                booking.admin_phone.clone(),
                MessageTemplate::TicketSummary {
                    property_name: booking.property_name.clone(),
                    guest_name: booking.guest_name.clone(),
                    due_amount: booking.due_amount(),
                },
            ),
        ];
        self.notifier.dispatch(&intents).await;

        tracing::info!(booking_id = %booking.id, "Ticket generated");

        Ok(booking)
    }

    /// Cancellation processing: branch on payment status, with the
    /// `refund_id`-already-set idempotency guard.
    pub async fn process_cancelled(&self, id: &Uuid) -> Result<CancellationOutcome, BookingError> {
        let booking = self.fetch_booking(id).await?;

        match plan_cancellation(&booking)? {
            CancellationPlan::AlreadyProcessed(refund_id) => {
                tracing::info!(booking_id = %booking.id, refund_id = %refund_id,
                    "Cancellation already processed, returning existing refund");
                Ok(CancellationOutcome {
                    booking,
                    refund_id: Some(refund_id),
                })
            }
            CancellationPlan::AlreadyClosed => {
                tracing::info!(booking_id = %booking.id, "Booking already closed without refund");
                Ok(CancellationOutcome {
                    booking,
                    refund_id: None,
                })
            }
            CancellationPlan::Refund => self.initiate_refund(booking).await,
            CancellationPlan::NoRefund => self.close_without_refund(booking).await,
        }
    }

    /// Handle a verified (or rejected) payment gateway verdict.
    ///
    /// Unverified payloads are logged and acknowledged without touching
    /// booking state; the gateway must not be able to advance a booking
    /// with a payload we cannot verify.
    pub async fn handle_payment_webhook(
        &self,
        verdict: GatewayVerdict,
    ) -> Result<WebhookOutcome, BookingError> {
        if !verdict.signature_valid {
            tracing::error!(
                order_id = %verdict.order_id,
                claimed_status = ?verdict.status,
                "Rejecting payment webhook with unverifiable signature"
            );
            return Ok(WebhookOutcome::RejectedUnverified);
        }

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE order_id = $1")
            .bind(&verdict.order_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("No booking for order {}", verdict.order_id))
            })?;

        match verdict.status {
            GatewayStatus::Success => {
                // Payment status, transaction id and the status advance are
                // one atomic write.
                let booking = match check_transition(
                    booking.booking_status,
                    BookingStatus::PaymentSuccess,
                )? {
                    TransitionOutcome::AlreadyInState => booking,
                    TransitionOutcome::Advance => sqlx::query_as::<_, Booking>(
                        r#"
                        UPDATE bookings
                        SET payment_status = $1, transaction_id = $2,
                            booking_status = $3, updated_at = $4
                        WHERE id = $5 AND booking_status = $6
                        RETURNING *
                        "#,
                    )
                    .bind(PaymentStatus::Success)
                    .bind(&verdict.transaction_id)
                    .bind(BookingStatus::PaymentSuccess)
                    .bind(Utc::now())
                    .bind(booking.id)
                    .bind(BookingStatus::PaymentPending)
                    .fetch_optional(&self.db_pool)
                    .await?
                    .ok_or_else(|| BookingError::InvalidTransition {
                        current: booking.booking_status,
                        allowed: crate::booking::state_machine::allowed_next(
                            booking.booking_status,
                        ),
                    })?,
                };

                let intents = vec![
                    NotificationIntent::new(
                        booking.owner_phone.clone(),
                        MessageTemplate::PaymentReceivedOwner {
                            guest_name: booking.guest_name.clone(),
                            property_name: booking.property_name.clone(),
                        },
                    ),
                    NotificationIntent::new(
                        booking.admin_phone.clone(),
                        MessageTemplate::PaymentReceivedAdmin {
                            guest_name: booking.guest_name.clone(),
                            amount: booking.advance_amount,
                        },
                    ),
                ];
                self.notifier.dispatch(&intents).await;

                // The owner has been asked; record it.
                let booking = self
                    .persist_transition(
                        &booking.id,
                        BookingStatus::PaymentSuccess,
                        BookingStatus::BookingRequestSentToOwner,
                    )
                    .await?;

                tracing::info!(booking_id = %booking.id, "Payment captured, owner notified");

                Ok(WebhookOutcome::PaymentCaptured(booking))
            }
            GatewayStatus::Pending => {
                let booking = self
                    .set_payment_status(&booking.id, PaymentStatus::Pending)
                    .await?;
                Ok(WebhookOutcome::PaymentPending(booking))
            }
            GatewayStatus::Failure => {
                let booking = self
                    .set_payment_status(&booking.id, PaymentStatus::Failed)
                    .await?;
                tracing::warn!(booking_id = %booking.id, "Payment failed at gateway");
                Ok(WebhookOutcome::PaymentFailed(booking))
            }
        }
    }

    // ===== Private helpers =====

    async fn fetch_booking(&self, id: &Uuid) -> Result<Booking, BookingError> {
        self.get_booking(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking {} not found", id)))
    }

    /// Guarded status write: only succeeds while the row is still in
    /// `from`. Zero rows updated means a concurrent writer got there
    /// first; re-read and report against the fresh state.
    async fn persist_transition(
        &self,
        id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET booking_status = $1, updated_at = $2
            WHERE id = $3 AND booking_status = $4
            RETURNING *
            "#,
        )
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(booking) => Ok(booking),
            None => {
                let current = self.fetch_booking(id).await?;
                Err(BookingError::InvalidTransition {
                    current: current.booking_status,
                    allowed: crate::booking::state_machine::allowed_next(current.booking_status),
                })
            }
        }
    }

    async fn set_payment_status(
        &self,
        id: &Uuid,
        status: PaymentStatus,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET payment_status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(booking)
    }

    async fn initiate_refund(&self, booking: Booking) -> Result<CancellationOutcome, BookingError> {
        let refund_id = generate_refund_id();

        // refund_id IS NULL keeps this idempotent against a concurrent
        // duplicate: exactly one caller wins the write.
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET booking_status = $1, refund_id = $2, updated_at = $3
            WHERE id = $4 AND booking_status = $5 AND refund_id IS NULL
            RETURNING *
            "#,
        )
        .bind(BookingStatus::RefundInitiated)
        .bind(&refund_id)
        .bind(Utc::now())
        .bind(booking.id)
        .bind(BookingStatus::OwnerCancelled)
        .fetch_optional(&self.db_pool)
        .await?;

        let booking = match updated {
            Some(booking) => booking,
            None => {
                // Lost the race; hand back whatever refund id won.
                let current = self.fetch_booking(&booking.id).await?;
                let existing = current.refund_id.clone();
                return Ok(CancellationOutcome {
                    booking: current,
                    refund_id: existing,
                });
            }
        };

        let intents = vec![
            NotificationIntent::new(
                booking.guest_phone.clone(),
                MessageTemplate::RefundInitiated {
                    refund_id: refund_id.clone(),
                    amount: booking.advance_amount,
                    sla_days: REFUND_SLA_DAYS,
                },
            ),
            NotificationIntent::new(
                booking.admin_phone.clone(),
                MessageTemplate::RefundSummary {
                    property_name: booking.property_name.clone(),
                    refund_id: refund_id.clone(),
                    amount: booking.advance_amount,
                },
            ),
        ];
        self.notifier.dispatch(&intents).await;

        tracing::info!(booking_id = %booking.id, refund_id = %refund_id, "Refund initiated");

        Ok(CancellationOutcome {
            booking,
            refund_id: Some(refund_id),
        })
    }

    async fn close_without_refund(
        &self,
        booking: Booking,
    ) -> Result<CancellationOutcome, BookingError> {
        let booking = self
            .persist_transition(
                &booking.id,
                BookingStatus::OwnerCancelled,
                BookingStatus::CancelledNoRefund,
            )
            .await?;

        let intents = vec![
            NotificationIntent::new(
                booking.guest_phone.clone(),
                MessageTemplate::CancelledNoRefund {
                    property_name: booking.property_name.clone(),
                },
            ),
            NotificationIntent::new(
                booking.admin_phone.clone(),
                MessageTemplate::CancelledSummary {
                    property_name: booking.property_name.clone(),
                    guest_name: booking.guest_name.clone(),
                },
            ),
        ];
        self.notifier.dispatch(&intents).await;

        tracing::info!(booking_id = %booking.id, "Booking closed without refund");

        Ok(CancellationOutcome {
            booking,
            refund_id: None,
        })
    }
}

/// Gateway order ids are assigned at creation so the webhook can correlate
fn generate_order_id() -> String {
    format!("HS-ORD-{}", Uuid::new_v4().simple())
}

/// Refund identifiers handed to the gateway's refund API
fn generate_refund_id() -> String {
    let suffix: u64 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("RF-{}-{:09}", Utc::now().format("%Y%m%d"), suffix)
}
