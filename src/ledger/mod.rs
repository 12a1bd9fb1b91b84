//! Ledger entries and the reconciliation engine

pub mod model;
pub mod plan;
pub mod service;

pub use model::{
    CreateLedgerEntryRequest, LedgerEntry, ListEntriesQuery, UpdateLedgerEntryRequest,
};
pub use plan::{expand_range, plan_create, plan_delete, plan_update, Adjustment, EntryRange};
pub use service::LedgerService;
