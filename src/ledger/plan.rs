//! Reconciliation planning
//!
//! A ledger entry mutation is translated into a pure list of per-date
//! adjustments before anything is written, isolating "what changes" from
//! the storage-level "how atomically". The services layer applies the
//! plan sequentially with conditional per-row updates.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

/// One per-date capacity adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub unit_id: Uuid,
    pub date: NaiveDate,
    /// Negative consumes capacity, positive releases it
    pub delta: i32,
}

/// The slice of a ledger entry that reconciliation cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRange {
    /// None means the whole-property pool: availability is computed on
    /// read, so no adjustments are planned
    pub unit_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub persons: i32,
}

/// Expand a half-open [check_in, check_out) stay into its calendar dates.
///
/// Checkout day is excluded so back-to-back stays never double-count the
/// turnover day. An inverted or zero-length range yields an empty
/// sequence rather than an error; upstream validation already rejects it,
/// the engine just must not misbehave on it.
pub fn expand_range(check_in: NaiveDate, check_out: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = check_in;
    while current < check_out {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Plan for recording a new entry: consume capacity over its range
pub fn plan_create(entry: &EntryRange) -> Vec<Adjustment> {
    let Some(unit_id) = entry.unit_id else {
        return Vec::new();
    };
    expand_range(entry.check_in, entry.check_out)
        .into_iter()
        .map(|date| Adjustment {
            unit_id,
            date,
            delta: -entry.persons,
        })
        .collect()
}

/// Plan for deleting an entry: release capacity over its range
pub fn plan_delete(entry: &EntryRange) -> Vec<Adjustment> {
    let Some(unit_id) = entry.unit_id else {
        return Vec::new();
    };
    expand_range(entry.check_in, entry.check_out)
        .into_iter()
        .map(|date| Adjustment {
            unit_id,
            date,
            delta: entry.persons,
        })
        .collect()
}

/// Plan for editing an entry: fully reverse the old range and persons
/// before consuming the new ones.
///
/// The reversal targets the OLD unit and the application the NEW unit, so
/// moving an entry between units reconciles both calendars. Ordering
/// matters: releases come first so a concurrent reader never sees the
/// stay counted twice.
pub fn plan_update(old: &EntryRange, new: &EntryRange) -> Vec<Adjustment> {
    let mut plan = plan_delete(old);
    plan.extend(plan_create(new));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(unit: Option<Uuid>, check_in: &str, check_out: &str, persons: i32) -> EntryRange {
        EntryRange {
            unit_id: unit,
            check_in: date(check_in),
            check_out: date(check_out),
            persons,
        }
    }

    #[test]
    fn test_expand_range_excludes_checkout() {
        let dates = expand_range(date("2024-03-01"), date("2024-03-04"));
        assert_eq!(
            dates,
            vec![date("2024-03-01"), date("2024-03-02"), date("2024-03-03")]
        );
    }

    #[test]
    fn test_expand_range_single_night() {
        let dates = expand_range(date("2024-03-01"), date("2024-03-02"));
        assert_eq!(dates, vec![date("2024-03-01")]);
    }

    #[test]
    fn test_expand_range_empty_and_inverted() {
        assert!(expand_range(date("2024-03-01"), date("2024-03-01")).is_empty());
        assert!(expand_range(date("2024-03-04"), date("2024-03-01")).is_empty());
    }

    #[test]
    fn test_plan_create_consumes_per_date() {
        let unit = Uuid::new_v4();
        let plan = plan_create(&entry(Some(unit), "2024-06-01", "2024-06-03", 2));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|a| a.unit_id == unit && a.delta == -2));
        assert_eq!(plan[0].date, date("2024-06-01"));
        assert_eq!(plan[1].date, date("2024-06-02"));
    }

    #[test]
    fn test_whole_property_entry_plans_nothing() {
        assert!(plan_create(&entry(None, "2024-06-01", "2024-06-03", 2)).is_empty());
        assert!(plan_delete(&entry(None, "2024-06-01", "2024-06-03", 2)).is_empty());
    }

    #[test]
    fn test_plan_update_reverses_before_applying() {
        let unit = Uuid::new_v4();
        let old = entry(Some(unit), "2024-06-01", "2024-06-03", 2);
        let new = entry(Some(unit), "2024-06-02", "2024-06-04", 3);
        let plan = plan_update(&old, &new);

        // Releases for the old range come first, in full.
        assert_eq!(
            &plan[..2],
            &[
                Adjustment { unit_id: unit, date: date("2024-06-01"), delta: 2 },
                Adjustment { unit_id: unit, date: date("2024-06-02"), delta: 2 },
            ]
        );
        assert_eq!(
            &plan[2..],
            &[
                Adjustment { unit_id: unit, date: date("2024-06-02"), delta: -3 },
                Adjustment { unit_id: unit, date: date("2024-06-03"), delta: -3 },
            ]
        );
    }

    #[test]
    fn test_plan_update_handles_unit_change() {
        let old_unit = Uuid::new_v4();
        let new_unit = Uuid::new_v4();
        let old = entry(Some(old_unit), "2024-06-01", "2024-06-02", 2);
        let new = entry(Some(new_unit), "2024-06-01", "2024-06-02", 2);
        let plan = plan_update(&old, &new);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].unit_id, old_unit);
        assert_eq!(plan[0].delta, 2);
        assert_eq!(plan[1].unit_id, new_unit);
        assert_eq!(plan[1].delta, -2);
    }

    #[test]
    fn test_plan_update_net_delta_zero_when_unchanged() {
        let unit = Uuid::new_v4();
        let same = entry(Some(unit), "2024-06-01", "2024-06-04", 2);
        let plan = plan_update(&same, &same);
        let net: i32 = plan.iter().map(|a| a.delta).sum();
        assert_eq!(net, 0);
    }
}
