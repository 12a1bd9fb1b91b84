//! Ledger entry models
//!
//! A ledger entry is an occupancy record independent of the guest booking
//! flow: walk-ins and owner-entered stays consuming the same inventory
//! pool. The half-open [check_in, check_out) convention applies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::ledger::plan::EntryRange;

/// Ledger entry model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub property_id: Uuid,
    /// None applies the entry to the whole-property pool (villas)
    pub unit_id: Option<Uuid>,
    pub customer_name: String,
    pub persons: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub payment_mode: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Reconciliation view of this entry
    pub fn range(&self) -> EntryRange {
        EntryRange {
            unit_id: self.unit_id,
            check_in: self.check_in,
            check_out: self.check_out,
            persons: self.persons,
        }
    }
}

/// Request DTO for creating a ledger entry
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLedgerEntryRequest {
    pub property_id: Uuid,
    pub unit_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub persons: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(length(min = 1))]
    pub payment_mode: String,
    pub amount: i64,
}

impl CreateLedgerEntryRequest {
    /// Cross-field validation
    pub fn validate_entry(&self) -> Result<(), String> {
        if self.persons <= 0 {
            return Err("Persons must be greater than 0".to_string());
        }
        if self.check_out <= self.check_in {
            return Err("Check-out must be after check-in".to_string());
        }
        if self.amount < 0 {
            return Err("Amount cannot be negative".to_string());
        }
        Ok(())
    }

    pub fn range(&self) -> EntryRange {
        EntryRange {
            unit_id: self.unit_id,
            check_in: self.check_in,
            check_out: self.check_out,
            persons: self.persons,
        }
    }
}

/// Request DTO for editing a ledger entry (full replacement)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLedgerEntryRequest {
    pub unit_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub persons: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(length(min = 1))]
    pub payment_mode: String,
    pub amount: i64,
}

impl UpdateLedgerEntryRequest {
    pub fn validate_entry(&self) -> Result<(), String> {
        if self.persons <= 0 {
            return Err("Persons must be greater than 0".to_string());
        }
        if self.check_out <= self.check_in {
            return Err("Check-out must be after check-in".to_string());
        }
        if self.amount < 0 {
            return Err("Amount cannot be negative".to_string());
        }
        Ok(())
    }

    pub fn range(&self) -> EntryRange {
        EntryRange {
            unit_id: self.unit_id,
            check_in: self.check_in,
            check_out: self.check_out,
            persons: self.persons,
        }
    }
}

/// Query parameters for listing ledger entries
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub property_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}
