//! Ledger entry service - entry CRUD plus calendar reconciliation
//!
//! Each mutation computes a pure adjustment plan, persists the entry row,
//! then applies the plan sequentially. The per-row writes are atomic at
//! the storage layer but the plan as a whole is not transactional, which
//! matches reference behavior: a concurrent reader can briefly observe
//! the old range reversed before the new one lands, and a failure midway
//! is logged loudly as a data-integrity risk rather than rolled back.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::BookingError;
use crate::inventory::CalendarService;
use crate::ledger::model::{
    CreateLedgerEntryRequest, LedgerEntry, ListEntriesQuery, UpdateLedgerEntryRequest,
};
use crate::ledger::plan::{plan_create, plan_delete, plan_update, Adjustment};

/// Ledger service for walk-in and owner-entered stays
#[derive(Clone)]
pub struct LedgerService {
    db_pool: PgPool,
    calendar: CalendarService,
}

impl LedgerService {
    /// Create a new ledger service instance
    pub fn new(db_pool: PgPool, calendar: CalendarService) -> Self {
        Self { db_pool, calendar }
    }

    /// Record a new entry and consume capacity over its date range
    pub async fn create_entry(
        &self,
        request: CreateLedgerEntryRequest,
    ) -> Result<LedgerEntry, BookingError> {
        request.validate_entry().map_err(BookingError::Validation)?;

        // Unit must exist before we touch its calendar.
        if let Some(unit_id) = &request.unit_id {
            self.calendar.unit_capacity(unit_id).await?;
        }

        let plan = plan_create(&request.range());

        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (
                id, property_id, unit_id, customer_name, persons,
                check_in, check_out, payment_mode, amount,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.property_id)
        .bind(request.unit_id)
        .bind(&request.customer_name)
        .bind(request.persons)
        .bind(request.check_in)
        .bind(request.check_out)
        .bind(&request.payment_mode)
        .bind(request.amount)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        self.apply_plan(&entry.id, &plan).await?;

        tracing::info!(entry_id = %entry.id, nights = plan.len(), "Ledger entry created");

        Ok(entry)
    }

    /// Get a single entry by ID
    pub async fn get_entry(&self, id: &Uuid) -> Result<Option<LedgerEntry>, BookingError> {
        let entry = sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(entry)
    }

    /// List entries with filtering and pagination
    pub async fn list_entries(
        &self,
        query: ListEntriesQuery,
    ) -> Result<Vec<LedgerEntry>, BookingError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM ledger_entries WHERE 1=1");

        if let Some(property_id) = query.property_id {
            query_builder.push(" AND property_id = ");
            query_builder.push_bind(property_id);
        }
        if let Some(unit_id) = query.unit_id {
            query_builder.push(" AND unit_id = ");
            query_builder.push_bind(unit_id);
        }

        query_builder.push(" ORDER BY check_in DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let entries = query_builder
            .build_query_as::<LedgerEntry>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(entries)
    }

    /// Edit an entry: reverse its previous range in full, then apply the
    /// new one. Old and new may target different units.
    pub async fn update_entry(
        &self,
        id: &Uuid,
        request: UpdateLedgerEntryRequest,
    ) -> Result<LedgerEntry, BookingError> {
        request.validate_entry().map_err(BookingError::Validation)?;

        let existing = self
            .get_entry(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Ledger entry {} not found", id)))?;

        if let Some(unit_id) = &request.unit_id {
            self.calendar.unit_capacity(unit_id).await?;
        }

        let plan = plan_update(&existing.range(), &request.range());

        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            UPDATE ledger_entries
            SET unit_id = $1, customer_name = $2, persons = $3,
                check_in = $4, check_out = $5, payment_mode = $6,
                amount = $7, updated_at = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(&request.customer_name)
        .bind(request.persons)
        .bind(request.check_in)
        .bind(request.check_out)
        .bind(&request.payment_mode)
        .bind(request.amount)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        self.apply_plan(id, &plan).await?;

        tracing::info!(entry_id = %entry.id, "Ledger entry updated and reconciled");

        Ok(entry)
    }

    /// Delete an entry and release the capacity it consumed
    pub async fn delete_entry(&self, id: &Uuid) -> Result<LedgerEntry, BookingError> {
        let existing = self
            .get_entry(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Ledger entry {} not found", id)))?;

        let plan = plan_delete(&existing.range());

        sqlx::query("DELETE FROM ledger_entries WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        self.apply_plan(id, &plan).await?;

        tracing::info!(entry_id = %existing.id, "Ledger entry deleted and reconciled");

        Ok(existing)
    }

    // ===== Private helpers =====

    /// Apply a reconciliation plan sequentially, in order.
    ///
    /// Consuming adjustments ensure the calendar row exists first, seeded
    /// at the unit's capacity. Releasing against a missing row is a
    /// logged no-op; seeding there would invent capacity.
    async fn apply_plan(
        &self,
        entry_id: &Uuid,
        plan: &[Adjustment],
    ) -> Result<(), BookingError> {
        let mut capacities: HashMap<Uuid, i32> = HashMap::new();

        for (step, adjustment) in plan.iter().enumerate() {
            let result = self.apply_adjustment(adjustment, &mut capacities).await;
            if let Err(e) = result {
                // The entry row is already persisted and the earlier steps
                // already landed; nothing rolls this back.
                tracing::error!(
                    entry_id = %entry_id,
                    step,
                    total_steps = plan.len(),
                    unit_id = %adjustment.unit_id,
                    date = %adjustment.date,
                    error = %e,
                    "Reconciliation aborted partway; calendar may be inconsistent with ledger entries"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    async fn apply_adjustment(
        &self,
        adjustment: &Adjustment,
        capacities: &mut HashMap<Uuid, i32>,
    ) -> Result<(), BookingError> {
        if adjustment.delta < 0 {
            let capacity = match capacities.get(&adjustment.unit_id) {
                Some(capacity) => *capacity,
                None => {
                    let capacity = self.calendar.unit_capacity(&adjustment.unit_id).await?;
                    capacities.insert(adjustment.unit_id, capacity);
                    capacity
                }
            };
            self.calendar
                .ensure_date_row(&adjustment.unit_id, adjustment.date, capacity)
                .await?;
        }

        let updated = self
            .calendar
            .adjust(&adjustment.unit_id, adjustment.date, adjustment.delta)
            .await?;

        if !updated {
            tracing::warn!(
                unit_id = %adjustment.unit_id,
                date = %adjustment.date,
                delta = adjustment.delta,
                "Release against a missing calendar row skipped"
            );
        }

        Ok(())
    }
}
