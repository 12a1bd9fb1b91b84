//! Inventory calendar models

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One per-unit, per-date capacity row
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct CalendarDay {
    pub unit_id: Uuid,
    pub date: NaiveDate,
    pub total_capacity: i32,
    /// Remaining capacity; floored at zero, never negative
    pub available_quantity: i32,
    /// Date-specific price override; None falls back to tier pricing
    pub price: Option<i64>,
    pub is_weekend: bool,
    pub is_special: bool,
    pub updated_at: DateTime<Utc>,
}

/// Per-date view returned by the calendar read API
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CalendarDayView {
    pub date: NaiveDate,
    pub price: Option<i64>,
    pub is_booked: bool,
    pub available_quantity: i32,
    pub total_capacity: i32,
}

/// Admin calendar edit: full-row upsert, last write wins
#[derive(Debug, Deserialize)]
pub struct CalendarOverrideRequest {
    pub date: NaiveDate,
    pub available_quantity: i32,
    pub price: Option<i64>,
    pub is_special: bool,
}

/// Query window for calendar reads
#[derive(Debug, Deserialize)]
pub struct CalendarWindowQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Saturdays and Sundays get the weekend pricing tier
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekend_detection() {
        // 2024-06-01 is a Saturday
        assert!(is_weekend("2024-06-01".parse().unwrap()));
        assert!(is_weekend("2024-06-02".parse().unwrap()));
        assert!(!is_weekend("2024-06-03".parse().unwrap()));
        assert!(!is_weekend("2024-06-07".parse().unwrap()));
    }
}
