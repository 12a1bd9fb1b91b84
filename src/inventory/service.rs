//! Inventory calendar service - per-date capacity tracking
//!
//! Each adjustment is a single server-side conditional update
//! (`GREATEST(0, available_quantity + delta)`), so concurrent adjustments
//! to the same date never lose writes and the floor invariant holds at
//! the storage layer.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::BookingError;
use crate::inventory::model::{
    is_weekend, CalendarDay, CalendarDayView, CalendarOverrideRequest,
};
use crate::ledger::plan::expand_range;

/// Calendar service over the `unit_calendar` table
#[derive(Clone)]
pub struct CalendarService {
    db_pool: PgPool,
}

impl CalendarService {
    /// Create a new calendar service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Capacity of a bookable unit, from the units table
    pub async fn unit_capacity(&self, unit_id: &Uuid) -> Result<i32, BookingError> {
        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM units WHERE id = $1")
                .bind(unit_id)
                .fetch_optional(&self.db_pool)
                .await?;

        capacity
            .map(|(c,)| c)
            .ok_or_else(|| BookingError::NotFound(format!("Unit {} not found", unit_id)))
    }

    /// Create the calendar row for a date if it does not exist yet,
    /// seeded at full capacity. Never clobbers an existing row.
    pub async fn ensure_date_row(
        &self,
        unit_id: &Uuid,
        date: NaiveDate,
        total_capacity: i32,
    ) -> Result<(), BookingError> {
        sqlx::query(
            r#"
            INSERT INTO unit_calendar (
                unit_id, date, total_capacity, available_quantity,
                is_weekend, is_special, updated_at
            )
            VALUES ($1, $2, $3, $3, $4, false, $5)
            ON CONFLICT (unit_id, date) DO NOTHING
            "#,
        )
        .bind(unit_id)
        .bind(date)
        .bind(total_capacity)
        .bind(is_weekend(date))
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Apply a capacity delta, floored at zero server-side.
    ///
    /// The floor is documented reference behavior: a release applied after
    /// the quantity was clamped at zero can under-restore availability.
    /// Returns whether a row was updated; releasing against a missing row
    /// is a no-op the caller may want to log.
    pub async fn adjust(
        &self,
        unit_id: &Uuid,
        date: NaiveDate,
        delta: i32,
    ) -> Result<bool, BookingError> {
        let result = sqlx::query(
            r#"
            UPDATE unit_calendar
            SET available_quantity = GREATEST(0, available_quantity + $1),
                updated_at = $2
            WHERE unit_id = $3 AND date = $4
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(unit_id)
        .bind(date)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Admin calendar edit: upsert the full row, last write wins.
    pub async fn set_override(
        &self,
        unit_id: &Uuid,
        request: CalendarOverrideRequest,
    ) -> Result<CalendarDay, BookingError> {
        if request.available_quantity < 0 {
            return Err(BookingError::Validation(
                "Available quantity cannot be negative".to_string(),
            ));
        }

        let total_capacity = self.unit_capacity(unit_id).await?;

        let day = sqlx::query_as::<_, CalendarDay>(
            r#"
            INSERT INTO unit_calendar (
                unit_id, date, total_capacity, available_quantity,
                price, is_weekend, is_special, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (unit_id, date) DO UPDATE
            SET available_quantity = EXCLUDED.available_quantity,
                price = EXCLUDED.price,
                is_special = EXCLUDED.is_special,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(unit_id)
        .bind(request.date)
        .bind(total_capacity)
        .bind(request.available_quantity)
        .bind(request.price)
        .bind(is_weekend(request.date))
        .bind(request.is_special)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(day)
    }

    /// Per-date availability for a unit over a half-open window.
    ///
    /// Dates with no stored row are synthesized at full capacity; a row
    /// only exists once something touched that date.
    pub async fn read_window(
        &self,
        unit_id: &Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDayView>, BookingError> {
        let capacity = self.unit_capacity(unit_id).await?;

        let rows = sqlx::query_as::<_, CalendarDay>(
            "SELECT * FROM unit_calendar WHERE unit_id = $1 AND date >= $2 AND date < $3",
        )
        .bind(unit_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db_pool)
        .await?;

        let stored: std::collections::HashMap<NaiveDate, CalendarDay> =
            rows.into_iter().map(|row| (row.date, row)).collect();

        let window = expand_range(from, to)
            .into_iter()
            .map(|date| match stored.get(&date) {
                Some(row) => CalendarDayView {
                    date,
                    price: row.price,
                    is_booked: row.available_quantity == 0,
                    available_quantity: row.available_quantity,
                    total_capacity: row.total_capacity,
                },
                None => CalendarDayView {
                    date,
                    price: None,
                    is_booked: false,
                    available_quantity: capacity,
                    total_capacity: capacity,
                },
            })
            .collect();

        Ok(window)
    }

    /// Whole-property availability (villas and unpooled entries), computed
    /// on read by aggregating overlapping entry counts against the
    /// property's capacity. Nothing is maintained incrementally here.
    pub async fn property_availability(
        &self,
        property_id: &Uuid,
        max_capacity: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDayView>, BookingError> {
        let entries: Vec<(NaiveDate, NaiveDate, i32)> = sqlx::query_as(
            r#"
            SELECT check_in, check_out, persons FROM ledger_entries
            WHERE property_id = $1 AND unit_id IS NULL
              AND check_in < $2 AND check_out > $3
            "#,
        )
        .bind(property_id)
        .bind(to)
        .bind(from)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(aggregate_availability(&entries, max_capacity, from, to))
    }
}

/// Pure per-date aggregation of overlapping stays against a capacity
fn aggregate_availability(
    entries: &[(NaiveDate, NaiveDate, i32)],
    max_capacity: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CalendarDayView> {
    expand_range(from, to)
        .into_iter()
        .map(|date| {
            let booked: i32 = entries
                .iter()
                .filter(|(check_in, check_out, _)| *check_in <= date && date < *check_out)
                .map(|(_, _, persons)| persons)
                .sum();
            let available = (max_capacity - booked).max(0);
            CalendarDayView {
                date,
                price: None,
                is_booked: available == 0,
                available_quantity: available,
                total_capacity: max_capacity,
            }
        })
        .collect()
}
